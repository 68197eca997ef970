use crate::services::history::DEFAULT_HISTORY_CAP;
use crate::sources::http::{DEFAULT_HISTORY_URL, DEFAULT_SPOT_URL};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Monitoring loop timing.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Sleep after a full pass over the active instruments.
    pub cycle_interval: Duration,
    /// Delay between successive price-source calls within a pass.
    pub pacing_delay: Duration,
    /// Upper bound on a single price-source call.
    pub fetch_timeout: Duration,
    /// Sleep after a cycle fails unexpectedly.
    pub recovery_backoff: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(60),
            pacing_delay: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(10),
            recovery_backoff: Duration::from_secs(60),
        }
    }
}

/// Indicator parameters.
#[derive(Debug, Clone)]
pub struct IndicatorConfig {
    /// Samples retained per instrument.
    pub history_cap: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            ema_fast_period: 8,
            ema_slow_period: 20,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Spot rate API base URL.
    pub spot_api_url: String,
    /// Historical rate API base URL.
    pub history_api_url: String,
    /// Subscriber persistence file.
    pub subscribers_file: PathBuf,
    /// Update every registry instrument regardless of subscriptions.
    pub track_all_instruments: bool,
    pub scheduler: SchedulerConfig,
    pub indicators: IndicatorConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let scheduler_defaults = SchedulerConfig::default();
        let indicator_defaults = IndicatorConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT").unwrap_or(10000),
            spot_api_url: env::var("SPOT_API_URL").unwrap_or_else(|_| DEFAULT_SPOT_URL.to_string()),
            history_api_url: env::var("HISTORY_API_URL")
                .unwrap_or_else(|_| DEFAULT_HISTORY_URL.to_string()),
            subscribers_file: env::var("SUBSCRIBERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/users.json")),
            track_all_instruments: env::var("TRACK_ALL_INSTRUMENTS")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            scheduler: SchedulerConfig {
                cycle_interval: parse_var("CYCLE_INTERVAL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(scheduler_defaults.cycle_interval),
                pacing_delay: parse_var("PACING_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(scheduler_defaults.pacing_delay),
                fetch_timeout: parse_var("FETCH_TIMEOUT_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(scheduler_defaults.fetch_timeout),
                recovery_backoff: parse_var("RECOVERY_BACKOFF_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(scheduler_defaults.recovery_backoff),
            },
            indicators: IndicatorConfig {
                history_cap: parse_var("HISTORY_CAP").unwrap_or(indicator_defaults.history_cap),
                ema_fast_period: parse_var("EMA_FAST_PERIOD")
                    .unwrap_or(indicator_defaults.ema_fast_period),
                ema_slow_period: parse_var("EMA_SLOW_PERIOD")
                    .unwrap_or(indicator_defaults.ema_slow_period),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
