use anyhow::{Context, Result};
use serde::Deserialize;
use sniper_api::DashboardConfig;
use sniper_brokers_deriv::DerivConfig;
use std::path::Path;

/// Contents of the optional `--config` TOML file.
///
/// ```toml
/// [dashboard]
/// bind = "127.0.0.1:10000"
/// poll_interval_ms = 1000
///
/// [deriv]
/// app_id = "1089"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub dashboard: DashboardConfig,
    pub deriv: DerivConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config.dashboard.bind, "0.0.0.0:10000");
        assert_eq!(config.dashboard.poll_interval_ms, 2000);
        assert_eq!(config.deriv.app_id, "1089");
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::parse(
            r#"
            [dashboard]
            poll_interval_ms = 500
            default_symbol = "R_50"

            [deriv]
            request_timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.dashboard.poll_interval_ms, 500);
        assert_eq!(config.dashboard.default_symbol, "R_50");
        assert_eq!(config.dashboard.candle_count, 60);
        assert_eq!(config.deriv.request_timeout_secs, 3);
        assert_eq!(config.deriv.endpoint, "wss://ws.derivws.com/websockets/v3");
    }

    #[test]
    fn test_unknown_types_are_rejected() {
        assert!(FileConfig::parse("[dashboard]\npoll_interval_ms = \"fast\"").is_err());
    }
}
