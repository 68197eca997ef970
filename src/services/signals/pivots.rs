//! Central pivot range (CPR) levels.

use crate::types::PivotBands;

/// Compute pivot bands from the prior session's high, low and close.
///
/// Pure: invalid inputs (NaN, negative) flow through unchanged.
pub fn compute_bands(high: f64, low: f64, close: f64) -> PivotBands {
    let pivot = (high + low + close) / 3.0;
    let bc = (high + low) / 2.0;
    let tc = 2.0 * pivot - bc;

    PivotBands {
        pivot,
        tc,
        bc,
        r1: 2.0 * pivot - low,
        r2: pivot + (high - low),
        r3: high + 2.0 * (pivot - low),
        s1: 2.0 * pivot - high,
        s2: pivot - (high - low),
        s3: low - 2.0 * (high - pivot),
    }
}
