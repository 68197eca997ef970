//! Consumer-facing levels report for one instrument.

use crate::services::signals::classify;
use crate::types::{Instrument, MarketSnapshot, SignalBias, SignalLabel};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A price level and how far it sits from the current price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDistance {
    pub name: &'static str,
    pub price: f64,
    /// `(level - current) * pip_multiplier`, one decimal.
    pub pips: f64,
}

/// Price, signal, EMAs and CPR levels for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelsReport {
    pub instrument: &'static str,
    pub name: &'static str,
    pub current_price: f64,
    pub signal: SignalLabel,
    pub bias: SignalBias,
    pub rationale: String,
    /// Fast then slow; only those already computed.
    pub emas: Vec<LevelDistance>,
    /// TC, PP, BC.
    pub cpr: Vec<LevelDistance>,
    /// R3, R2, R1.
    pub resistance: Vec<LevelDistance>,
    /// S1, S2, S3.
    pub support: Vec<LevelDistance>,
    pub last_update: Option<DateTime<Utc>>,
}

impl LevelsReport {
    /// Build a report, or `None` while the instrument has no levels yet.
    pub fn build(instrument: &'static Instrument, snapshot: &MarketSnapshot) -> Option<Self> {
        let (current, bands) = match (snapshot.current_price, snapshot.bands) {
            (Some(price), Some(bands)) => (price, bands),
            _ => return None,
        };

        let decimals = instrument.price_decimals() as i32;
        let level = |name: &'static str, price: f64| LevelDistance {
            name,
            price: round_to(price, decimals),
            pips: round_to((price - current) * instrument.pip_multiplier(), 1),
        };

        let signal = classify(snapshot, instrument.pip_multiplier());

        let emas = [("EMA fast", snapshot.ema_fast), ("EMA slow", snapshot.ema_slow)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| level(name, v)))
            .collect();

        Some(Self {
            instrument: instrument.id,
            name: instrument.name,
            current_price: round_to(current, decimals),
            signal: signal.label,
            bias: signal.bias(),
            rationale: signal.rationale,
            emas,
            cpr: vec![
                level("TC", bands.tc),
                level("PP", bands.pivot),
                level("BC", bands.bc),
            ],
            resistance: vec![
                level("R3", bands.r3),
                level("R2", bands.r2),
                level("R1", bands.r1),
            ],
            support: vec![
                level("S1", bands.s1),
                level("S2", bands.s2),
                level("S3", bands.s3),
            ],
            last_update: snapshot.last_update,
        })
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
