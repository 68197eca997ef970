pub mod instrument;
pub mod market;
pub mod signal;
pub mod subscriber;

pub use instrument::*;
pub use market::*;
pub use signal::*;
pub use subscriber::*;
