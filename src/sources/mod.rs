//! Price sources feeding the update pipeline.

pub mod http;

pub use http::HttpRateSource;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a rate. Always transient from the engine's view.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("no {quote} rate for {base} in response")]
    MissingRate { base: String, quote: String },

    #[error("invalid rate {0}")]
    InvalidRate(f64),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// A source of spot rates and prior-session closes.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Current rate for `base/quote`.
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, FetchError>;

    /// Closing rate for `base/quote` on `date`.
    async fn fetch_prior_close(
        &self,
        base: &str,
        quote: &str,
        date: NaiveDate,
    ) -> Result<f64, FetchError>;
}

/// Reject rates no market would quote.
pub(crate) fn validate_rate(rate: f64) -> Result<f64, FetchError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(FetchError::InvalidRate(rate))
    }
}
