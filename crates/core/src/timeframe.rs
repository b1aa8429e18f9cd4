use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle granularities (in seconds) the broker can serve.
pub const SUPPORTED_GRANULARITIES: [u32; 12] = [
    60, 120, 180, 300, 600, 900, 1800, 3600, 7200, 14400, 28800, 86400,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeframeError {
    #[error("Invalid timeframe '{0}': expected e.g. 1m, 5m, 1h, 1d or seconds")]
    Invalid(String),
    #[error("Unsupported timeframe of {0}s: supported granularities are 1m, 2m, 3m, 5m, 10m, 15m, 30m, 1h, 2h, 4h, 8h, 1d")]
    Unsupported(u32),
}

/// Candle timeframe, stored as a whole number of seconds.
///
/// Parses `"5m"`, `"1h"`, `"1d"`, `"60s"` or bare seconds (`"300"`), and
/// always displays in the shortest unit form (`300` → `"5m"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe(u32);

impl Timeframe {
    pub const M1: Timeframe = Timeframe(60);
    pub const M5: Timeframe = Timeframe(300);

    /// Build a timeframe from seconds, rejecting granularities the broker does not serve.
    pub fn from_secs(secs: u32) -> Result<Self, TimeframeError> {
        if SUPPORTED_GRANULARITIES.contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(TimeframeError::Unsupported(secs))
        }
    }

    pub fn as_secs(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.0))
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let invalid = || TimeframeError::Invalid(s.to_string());

        if raw.is_empty() {
            return Err(invalid());
        }

        let (digits, multiplier) = match raw.chars().last() {
            Some('s') => (&raw[..raw.len() - 1], 1),
            Some('m') => (&raw[..raw.len() - 1], 60),
            Some('h') => (&raw[..raw.len() - 1], 3600),
            Some('d') => (&raw[..raw.len() - 1], 86400),
            Some(c) if c.is_ascii_digit() => (raw.as_str(), 1),
            _ => return Err(invalid()),
        };

        let value: u32 = digits.parse().map_err(|_| invalid())?;
        let secs = value.checked_mul(multiplier).ok_or_else(invalid)?;
        Self::from_secs(secs)
    }
}

impl TryFrom<String> for Timeframe {
    type Error = TimeframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0;
        if secs % 86400 == 0 {
            write!(f, "{}d", secs / 86400)
        } else if secs % 3600 == 0 {
            write!(f, "{}h", secs / 3600)
        } else if secs % 60 == 0 {
            write!(f, "{}m", secs / 60)
        } else {
            write!(f, "{}s", secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("5m".parse::<Timeframe>().unwrap().as_secs(), 300);
        assert_eq!("1H".parse::<Timeframe>().unwrap().as_secs(), 3600);
        assert_eq!("1d".parse::<Timeframe>().unwrap().as_secs(), 86400);
        assert_eq!("60s".parse::<Timeframe>().unwrap().as_secs(), 60);
        assert_eq!(" 300 ".parse::<Timeframe>().unwrap().as_secs(), 300);
    }

    #[test]
    fn test_display_is_canonical() {
        let tf: Timeframe = "900".parse().unwrap();
        assert_eq!(tf.to_string(), "15m");
        let tf: Timeframe = "120m".parse().unwrap();
        assert_eq!(tf.to_string(), "2h");
    }

    #[test]
    fn test_rejects_garbage_and_unsupported() {
        assert!(matches!("".parse::<Timeframe>(), Err(TimeframeError::Invalid(_))));
        assert!(matches!("5x".parse::<Timeframe>(), Err(TimeframeError::Invalid(_))));
        assert!(matches!("m".parse::<Timeframe>(), Err(TimeframeError::Invalid(_))));
        assert_eq!("7m".parse::<Timeframe>(), Err(TimeframeError::Unsupported(420)));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Timeframe::M5).unwrap();
        assert_eq!(json, "\"5m\"");
        let tf: Timeframe = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(tf.as_secs(), 3600);
        assert!(serde_json::from_str::<Timeframe>("\"4m\"").is_err());
    }
}
