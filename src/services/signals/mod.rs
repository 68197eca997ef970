//! Signal computation: pivot bands, moving averages and classification.
//!
//! Everything here is pure; state lives in the history buffer and the
//! snapshot store.

pub mod classifier;
pub mod ema;
pub mod pivots;

pub use classifier::classify;
pub use ema::{calculate_ema, EmaPair, EmaTracker};
pub use pivots::compute_bands;
