//! CPR + EMA signal classification.
//!
//! A pure decision table over a [`MarketSnapshot`]:
//! - above TC: buy side, strength depends on R1 and the EMAs
//! - below BC: sell side, strength depends on S1 and the EMAs
//! - inside the CPR: neutral, leaning by pivot and fast EMA

use crate::types::{MarketSnapshot, SignalLabel, TradingSignal};

/// Classify the current price of `snapshot`.
///
/// `pip_multiplier` converts the distance from the pivot into pips.
pub fn classify(snapshot: &MarketSnapshot, pip_multiplier: f64) -> TradingSignal {
    let (price, bands) = match (snapshot.current_price, snapshot.bands) {
        (Some(price), Some(bands)) => (price, bands),
        _ => return TradingSignal::new(SignalLabel::Wait, "Levels not yet available"),
    };

    let distance = (price - bands.pivot) * pip_multiplier;
    let trend = ema_annotation(price, snapshot.ema_fast, snapshot.ema_slow);

    // An unset EMA sits at zero: price is always above it, never below.
    let above = |ema: Option<f64>| ema.map_or(true, |e| price > e);
    let below = |ema: Option<f64>| ema.is_some_and(|e| price < e);
    let (fast, slow) = (snapshot.ema_fast, snapshot.ema_slow);

    let (label, headline) = if price > bands.tc {
        if price > bands.r1 && above(fast) && above(slow) {
            (SignalLabel::StrongBuy, "Price above TC, R1 and both EMAs")
        } else if above(fast) {
            (SignalLabel::Buy, "Price above TC and fast EMA")
        } else {
            (SignalLabel::WeakBuy, "Price above TC but not above fast EMA")
        }
    } else if price < bands.bc {
        if price < bands.s1 && below(fast) && below(slow) {
            (SignalLabel::StrongSell, "Price below BC, S1 and both EMAs")
        } else if below(fast) {
            (SignalLabel::Sell, "Price below BC and fast EMA")
        } else {
            (SignalLabel::WeakSell, "Price below BC but not below fast EMA")
        }
    } else if price > bands.pivot && above(fast) {
        (SignalLabel::NeutralBullish, "In CPR, above pivot and fast EMA")
    } else if price < bands.pivot && below(fast) {
        (SignalLabel::NeutralBearish, "In CPR, below pivot and fast EMA")
    } else {
        (SignalLabel::Neutral, "In CPR zone")
    };

    let mut rationale = String::from(headline);
    if !trend.is_empty() {
        rationale.push('\n');
        rationale.push_str(&trend);
    }
    rationale.push_str(&format!("\n{:+.1} pips from pivot", distance));

    TradingSignal::new(label, rationale)
}

/// Breakout and trend notes; empty unless both EMAs are set.
fn ema_annotation(price: f64, fast: Option<f64>, slow: Option<f64>) -> String {
    let (Some(fast), Some(slow)) = (fast, slow) else {
        return String::new();
    };

    let breakout = if price > fast {
        "Breakout: Above fast EMA"
    } else {
        "Breakout: Below fast EMA"
    };
    let trend = if price > slow {
        "Trend: Bullish (Above slow EMA)"
    } else {
        "Trend: Bearish (Below slow EMA)"
    };

    format!("{}\n{}", breakout, trend)
}
