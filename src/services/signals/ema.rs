//! Exponential Moving Average (EMA) tracking.

use serde::{Deserialize, Serialize};

/// Calculate the EMA of `prices` (oldest first).
///
/// Seeded with the SMA of the first `period` samples, then folded over the
/// rest with `k = 2 / (period + 1)`. Returns `None` until at least `period`
/// samples exist.
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);

    // First EMA is SMA
    let sma: f64 = prices.iter().take(period).sum::<f64>() / period as f64;

    let mut ema = sma;
    for price in prices.iter().skip(period) {
        ema = price * k + ema * (1.0 - k);
    }

    Some(ema)
}

/// Fast and slow EMA values for one instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmaPair {
    pub fast: Option<f64>,
    pub slow: Option<f64>,
}

/// Recomputes a fast/slow EMA pair from a price window.
#[derive(Debug, Clone, Copy)]
pub struct EmaTracker {
    fast_period: usize,
    slow_period: usize,
}

impl EmaTracker {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
        }
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    /// Full recompute over `history`. An indicator that is not yet
    /// computable keeps its `previous` value.
    pub fn update(&self, history: &[f64], previous: EmaPair) -> EmaPair {
        EmaPair {
            fast: calculate_ema(history, self.fast_period).or(previous.fast),
            slow: calculate_ema(history, self.slow_period).or(previous.slow),
        }
    }
}

impl Default for EmaTracker {
    fn default() -> Self {
        Self::new(8, 20)
    }
}
