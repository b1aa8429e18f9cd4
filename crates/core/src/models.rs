use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLC candle as served by the broker's history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// Absolute size of the candle body.
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    pub fn upper_wick(&self) -> Decimal {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> Decimal {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Demo,
    Real,
    #[default]
    Unknown,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Demo => write!(f, "demo"),
            AccountType::Real => write!(f, "real"),
            AccountType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Account details reported by the broker after authorization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub account_type: AccountType,
    pub currency: String,
    pub login_id: String,
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Trade direction recommended by a signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Call,
    Put,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Call => write!(f, "CALL"),
            Direction::Put => write!(f, "PUT"),
            Direction::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

impl Trend {
    /// Classify by comparing a fast reference line against a slow one.
    pub fn from_lines(fast: Decimal, slow: Decimal) -> Self {
        if fast > slow {
            Trend::Bullish
        } else if fast < slow {
            Trend::Bearish
        } else {
            Trend::Sideways
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
            Trend::Sideways => write!(f, "sideways"),
        }
    }
}

/// Raw output of a signal generator, before it is placed in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub direction: Direction,
    /// 0..=100
    pub confidence: u8,
    pub trend: Trend,
    pub strategy_used: String,
    pub indicator_status: String,
    pub justification: String,
}

/// Signal response payload. Computed per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPayload {
    pub symbol: String,
    pub timeframe: String,
    pub direction: Direction,
    pub confidence: u8,
    pub trend: Trend,
    pub strategy_used: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub indicator_status: String,
    pub justification: String,
}

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

/// A stored bot configuration with an on/off flag. Bots never trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRecord {
    pub id: Uuid,
    pub name: String,
    pub symbol: String,
    pub timeframe: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub stop_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub take_profit: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl BotRecord {
    /// Create an inactive record with a fresh id.
    pub fn new(config: BotConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: config.name,
            symbol: config.symbol,
            timeframe: config.timeframe,
            stop_loss: config.stop_loss,
            take_profit: config.take_profit,
            is_active: false,
            created_at: Utc::now(),
        }
    }
}

/// Bot creation payload. Accepts the short field names older dashboards send
/// (`tf`, `sl`, `tp`) and a timeframe given either as text or as seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotConfig {
    pub name: String,
    pub symbol: String,
    #[serde(alias = "tf", deserialize_with = "string_or_number")]
    pub timeframe: String,
    #[serde(alias = "sl", with = "rust_decimal::serde::float")]
    pub stop_loss: Decimal,
    #[serde(alias = "tp", with = "rust_decimal::serde::float")]
    pub take_profit: Decimal,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle {
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn test_candle_anatomy() {
        let c = candle(dec!(10), dec!(15), dec!(8), dec!(12));
        assert_eq!(c.body(), dec!(2));
        assert_eq!(c.upper_wick(), dec!(3));
        assert_eq!(c.lower_wick(), dec!(2));
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
    }

    #[test]
    fn test_direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Call).unwrap(), "\"CALL\"");
        assert_eq!(serde_json::to_string(&Direction::Neutral).unwrap(), "\"NEUTRAL\"");
    }

    #[test]
    fn test_bot_config_accepts_short_names() {
        let json = r#"{"name":"B1","symbol":"EURUSD","tf":"5m","sl":10,"tp":20.5}"#;
        let config: BotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.timeframe, "5m");
        assert_eq!(config.stop_loss, dec!(10));
        assert_eq!(config.take_profit, dec!(20.5));
    }

    #[test]
    fn test_bot_config_accepts_numeric_timeframe() {
        let json = r#"{"name":"B2","symbol":"R_100","timeframe":60,"stop_loss":1,"take_profit":2}"#;
        let config: BotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.timeframe, "60");
    }

    #[test]
    fn test_bot_config_rejects_wrong_types() {
        let json = r#"{"name":"B3","symbol":"R_100","tf":"5m","stop_loss":true,"take_profit":2}"#;
        assert!(serde_json::from_str::<BotConfig>(json).is_err());
    }

    #[test]
    fn test_bot_record_starts_inactive() {
        let json = r#"{"name":"B1","symbol":"EURUSD","tf":"5m","stop_loss":10,"take_profit":20}"#;
        let record = BotRecord::new(serde_json::from_str(json).unwrap());
        assert!(!record.is_active);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["stop_loss"], serde_json::json!(10.0));
        assert_eq!(value["is_active"], serde_json::json!(false));
    }
}
