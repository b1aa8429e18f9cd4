use serde::{Deserialize, Serialize};

/// Settings for the dashboard server. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// How often the browser polls `/status` and `/signal`.
    pub poll_interval_ms: u64,
    /// Candles requested from the broker for each signal.
    pub candle_count: usize,
    pub default_symbol: String,
    pub default_timeframe: String,
    pub default_strategy: String,
    /// Seconds between keepalive pings while connected; 0 turns them off.
    pub keepalive_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:10000".to_string(),
            poll_interval_ms: 2000,
            candle_count: 60,
            default_symbol: "R_100".to_string(),
            default_timeframe: "5m".to_string(),
            default_strategy: sniper_strategies::DEFAULT_STRATEGY.to_string(),
            keepalive_secs: 30,
        }
    }
}
