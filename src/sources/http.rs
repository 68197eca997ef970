//! HTTP rate source.
//!
//! Spot rates come from an exchangerate-api style endpoint
//! (`{spot_url}/latest/{base}`), prior closes from a frankfurter style
//! endpoint (`{history_url}/{date}?from={base}&to={quote}`). Both answer
//! with a `rates` object keyed by quote currency.

use super::{validate_rate, FetchError, PriceSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SPOT_URL: &str = "https://api.exchangerate-api.com/v4";
pub const DEFAULT_HISTORY_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl RatesResponse {
    fn rate(&self, base: &str, quote: &str) -> Result<f64, FetchError> {
        let rate = self
            .rates
            .get(quote)
            .copied()
            .ok_or_else(|| FetchError::MissingRate {
                base: base.to_string(),
                quote: quote.to_string(),
            })?;
        validate_rate(rate)
    }
}

/// reqwest-backed [`PriceSource`].
#[derive(Clone)]
pub struct HttpRateSource {
    client: Client,
    spot_url: String,
    history_url: String,
}

impl HttpRateSource {
    /// Create a source against the given base URLs. `timeout` bounds every
    /// request.
    pub fn new(spot_url: impl Into<String>, history_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("pivotwatch/0.1")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            spot_url: spot_url.into().trim_end_matches('/').to_string(),
            history_url: history_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_rates(&self, url: &str) -> Result<RatesResponse, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.json::<RatesResponse>().await?)
    }
}

#[async_trait]
impl PriceSource for HttpRateSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, FetchError> {
        let url = format!("{}/latest/{}", self.spot_url, base);
        let rate = self.get_rates(&url).await?.rate(base, quote)?;
        debug!("Spot {}/{} = {}", base, quote, rate);
        Ok(rate)
    }

    async fn fetch_prior_close(
        &self,
        base: &str,
        quote: &str,
        date: NaiveDate,
    ) -> Result<f64, FetchError> {
        let url = format!(
            "{}/{}?from={}&to={}",
            self.history_url,
            date.format("%Y-%m-%d"),
            base,
            quote
        );
        let rate = self.get_rates(&url).await?.rate(base, quote)?;
        debug!("Close {}/{} on {} = {}", base, quote, date, rate);
        Ok(rate)
    }
}
