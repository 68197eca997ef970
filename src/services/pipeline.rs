use crate::config::IndicatorConfig;
use crate::services::signals::{compute_bands, EmaPair, EmaTracker};
use crate::services::{PriceHistory, SnapshotStore};
use crate::sources::{FetchError, PriceSource};
use crate::types::{Instrument, MarketSnapshot, SessionQuote};
use chrono::{Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Prior close assumed, relative to spot, when no historical rate is available.
pub const PRIOR_CLOSE_FALLBACK: f64 = 0.999;

/// Fetch -> history -> bands -> EMA -> commit for one instrument at a time.
///
/// Meant to be driven by a single caller (the scheduler); concurrent updates
/// of the same instrument are not supported.
pub struct UpdatePipeline {
    source: Arc<dyn PriceSource>,
    history: PriceHistory,
    store: Arc<SnapshotStore>,
    ema: EmaTracker,
    fetch_timeout: Duration,
}

impl UpdatePipeline {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<SnapshotStore>,
        indicators: &IndicatorConfig,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            history: PriceHistory::new(indicators.history_cap),
            store,
            ema: EmaTracker::new(indicators.ema_fast_period, indicators.ema_slow_period),
            fetch_timeout,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    /// Spot rate plus the prior session's range.
    ///
    /// Spot failures are returned; a missing prior close falls back to
    /// `spot * PRIOR_CLOSE_FALLBACK`.
    pub async fn fetch_session(&self, instrument: &Instrument) -> Result<SessionQuote, FetchError> {
        let current = self
            .bounded(self.source.fetch_rate(instrument.base, instrument.quote))
            .await?;

        let yesterday = (Utc::now() - ChronoDuration::days(1)).date_naive();
        let prev_close = match self
            .bounded(
                self.source
                    .fetch_prior_close(instrument.base, instrument.quote, yesterday),
            )
            .await
        {
            Ok(close) => close,
            Err(e) => {
                debug!(
                    "No prior close for {} from {} ({}), using fallback",
                    instrument,
                    self.source.name(),
                    e
                );
                current * PRIOR_CLOSE_FALLBACK
            }
        };

        Ok(SessionQuote::from_prior_close(
            current,
            prev_close,
            instrument.band_width(),
        ))
    }

    /// Refresh one instrument and commit its new snapshot.
    ///
    /// On failure nothing is mutated and the previous snapshot stays visible.
    pub async fn update_one(&self, instrument: &Instrument) -> Result<MarketSnapshot, FetchError> {
        let quote = self.fetch_session(instrument).await?;

        self.history.append(instrument.id, quote.current);
        let samples = self.history.as_sequence(instrument.id);

        let previous = self
            .store
            .get_snapshot(instrument.id)
            .unwrap_or_else(|| MarketSnapshot::unset(instrument.id));
        let emas = self.ema.update(
            &samples,
            EmaPair {
                fast: previous.ema_fast,
                slow: previous.ema_slow,
            },
        );

        let snapshot = MarketSnapshot {
            instrument: instrument.id.to_string(),
            current_price: Some(quote.current),
            bands: Some(compute_bands(quote.prev_high, quote.prev_low, quote.prev_close)),
            prev_high: Some(quote.prev_high),
            prev_low: Some(quote.prev_low),
            prev_close: Some(quote.prev_close),
            ema_fast: emas.fast,
            ema_slow: emas.slow,
            last_update: Some(Utc::now()),
        };

        self.store.commit(snapshot.clone());
        Ok(snapshot)
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        tokio::time::timeout(self.fetch_timeout, fut)
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
    }
}
