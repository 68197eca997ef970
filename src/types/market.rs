use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spot price plus the prior session's high/low/close for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuote {
    pub current: f64,
    pub prev_high: f64,
    pub prev_low: f64,
    pub prev_close: f64,
}

impl SessionQuote {
    /// Build a quote from a prior close alone, widening it into a synthetic
    /// high/low range of `close * (1 ± band_width)`.
    pub fn from_prior_close(current: f64, prev_close: f64, band_width: f64) -> Self {
        Self {
            current,
            prev_high: prev_close * (1.0 + band_width),
            prev_low: prev_close * (1.0 - band_width),
            prev_close,
        }
    }
}

/// Central pivot range plus three support and resistance levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotBands {
    pub pivot: f64,
    /// Top central band.
    pub tc: f64,
    /// Bottom central band.
    pub bc: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

/// Latest committed state for one instrument.
///
/// Every optional field stays `None` until the first successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub instrument: String,
    pub current_price: Option<f64>,
    pub bands: Option<PivotBands>,
    pub prev_high: Option<f64>,
    pub prev_low: Option<f64>,
    pub prev_close: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub last_update: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// An empty snapshot for an instrument that has never been updated.
    pub fn unset(instrument: &str) -> Self {
        Self {
            instrument: instrument.to_string(),
            current_price: None,
            bands: None,
            prev_high: None,
            prev_low: None,
            prev_close: None,
            ema_fast: None,
            ema_slow: None,
            last_update: None,
        }
    }

    /// Whether levels are available for consumers.
    pub fn is_ready(&self) -> bool {
        self.bands.is_some()
    }
}
