pub mod ema_rsi;
pub mod sniper;

use sniper_core::SignalGenerator;
use std::sync::Arc;

pub use ema_rsi::{EmaRsiConfig, EmaRsiStrategy};
pub use sniper::{SniperConfig, SniperStrategy};

/// Identifier of the generator used when a request names none.
pub const DEFAULT_STRATEGY: &str = "sniper";

/// Every built-in generator with its default configuration.
pub fn catalogue() -> Vec<Arc<dyn SignalGenerator>> {
    vec![
        Arc::new(SniperStrategy::new(SniperConfig::default())),
        Arc::new(EmaRsiStrategy::new(EmaRsiConfig::default())),
    ]
}
