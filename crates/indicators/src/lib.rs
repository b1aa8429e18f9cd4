//! Technical indicators evaluated over a window of closing prices.
//!
//! Every function takes the full series (oldest first) and returns the
//! indicator value at the last element, or `None` when the series is too
//! short. Signals are recomputed per request, so nothing here keeps state.

pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger, decimal_sqrt, std_dev, Bands};
pub use ema::{ema, trailing_ema};
pub use rsi::{rsi, split_rsi};
pub use sma::sma;
