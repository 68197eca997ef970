use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trading signal derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalLabel {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "BUY (Weak)")]
    WeakBuy,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "SELL (Weak)")]
    WeakSell,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "NEUTRAL (Bullish)")]
    NeutralBullish,
    #[serde(rename = "NEUTRAL (Bearish)")]
    NeutralBearish,
    #[serde(rename = "WAIT")]
    Wait,
}

/// Coarse direction of a label, used by consumers for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

impl SignalLabel {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalLabel::StrongBuy => "STRONG BUY",
            SignalLabel::Buy => "BUY",
            SignalLabel::WeakBuy => "BUY (Weak)",
            SignalLabel::StrongSell => "STRONG SELL",
            SignalLabel::Sell => "SELL",
            SignalLabel::WeakSell => "SELL (Weak)",
            SignalLabel::Neutral => "NEUTRAL",
            SignalLabel::NeutralBullish => "NEUTRAL (Bullish)",
            SignalLabel::NeutralBearish => "NEUTRAL (Bearish)",
            SignalLabel::Wait => "WAIT",
        }
    }

    /// Buy-side labels are bullish, sell-side bearish, everything else neutral.
    pub fn bias(&self) -> SignalBias {
        match self {
            SignalLabel::StrongBuy | SignalLabel::Buy | SignalLabel::WeakBuy => SignalBias::Bullish,
            SignalLabel::StrongSell | SignalLabel::Sell | SignalLabel::WeakSell => {
                SignalBias::Bearish
            }
            _ => SignalBias::Neutral,
        }
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A label plus the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub label: SignalLabel,
    pub rationale: String,
}

impl TradingSignal {
    pub fn new(label: SignalLabel, rationale: impl Into<String>) -> Self {
        Self {
            label,
            rationale: rationale.into(),
        }
    }

    pub fn bias(&self) -> SignalBias {
        self.label.bias()
    }
}
