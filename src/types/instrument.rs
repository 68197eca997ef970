use serde::Serialize;
use std::fmt;

/// A tracked currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Instrument {
    /// Canonical identifier, e.g. "EUR/USD".
    pub id: &'static str,
    /// Base currency code.
    pub base: &'static str,
    /// Quote currency code.
    pub quote: &'static str,
    /// Display name.
    pub name: &'static str,
}

/// Every instrument the engine tracks, in update order.
pub const INSTRUMENTS: &[Instrument] = &[
    Instrument::new("EUR/USD", "EUR", "USD", "Euro / US Dollar"),
    Instrument::new("GBP/USD", "GBP", "USD", "British Pound / US Dollar"),
    Instrument::new("USD/JPY", "USD", "JPY", "US Dollar / Japanese Yen"),
    Instrument::new("USD/CHF", "USD", "CHF", "US Dollar / Swiss Franc"),
    Instrument::new("AUD/USD", "AUD", "USD", "Australian Dollar / US Dollar"),
    Instrument::new("USD/CAD", "USD", "CAD", "US Dollar / Canadian Dollar"),
    Instrument::new("NZD/USD", "NZD", "USD", "New Zealand Dollar / US Dollar"),
    Instrument::new("EUR/GBP", "EUR", "GBP", "Euro / British Pound"),
    Instrument::new("EUR/JPY", "EUR", "JPY", "Euro / Japanese Yen"),
    Instrument::new("GBP/JPY", "GBP", "JPY", "British Pound / Japanese Yen"),
];

impl Instrument {
    const fn new(
        id: &'static str,
        base: &'static str,
        quote: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            id,
            base,
            quote,
            name,
        }
    }

    /// Look up an instrument by identifier.
    ///
    /// Accepts "EUR/USD", "eur/usd", "EUR_USD", "EUR-USD" and "EURUSD".
    pub fn lookup(id: &str) -> Option<&'static Instrument> {
        let wanted: String = id
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        INSTRUMENTS
            .iter()
            .find(|i| wanted.len() == 6 && wanted[..3] == *i.base && wanted[3..] == *i.quote)
    }

    /// Whether the pair is quoted in yen.
    pub fn is_jpy_quoted(&self) -> bool {
        self.quote == "JPY"
    }

    /// Multiplier converting a price difference into pips.
    pub fn pip_multiplier(&self) -> f64 {
        if self.is_jpy_quoted() {
            100.0
        } else {
            10_000.0
        }
    }

    /// Decimal places used when displaying prices.
    pub fn price_decimals(&self) -> usize {
        if self.is_jpy_quoted() {
            2
        } else {
            5
        }
    }

    /// Half-width of the synthetic prior-session range, as a fraction of the
    /// prior close.
    pub fn band_width(&self) -> f64 {
        if self.is_jpy_quoted() {
            0.005
        } else {
            0.002
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
