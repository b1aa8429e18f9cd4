use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sniper_core::{AccountInfo, AccountType, BrokerError, Candle};

/// Requests sent TO the Deriv API.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Present an API token.
    Authorize { authorize: String, req_id: u64 },
    /// Candle history ending at the latest bar.
    TicksHistory {
        ticks_history: String,
        end: String,
        count: usize,
        style: String,
        granularity: u32,
        req_id: u64,
    },
    /// Keep-alive.
    Ping { ping: u8, req_id: u64 },
}

impl OutboundMessage {
    pub fn authorize(token: &str, req_id: u64) -> Self {
        Self::Authorize {
            authorize: token.to_string(),
            req_id,
        }
    }

    pub fn candles(symbol: &str, granularity: u32, count: usize, req_id: u64) -> Self {
        Self::TicksHistory {
            ticks_history: symbol.to_string(),
            end: "latest".to_string(),
            count,
            style: "candles".to_string(),
            granularity,
            req_id,
        }
    }

    pub fn ping(req_id: u64) -> Self {
        Self::Ping { ping: 1, req_id }
    }

    pub fn req_id(&self) -> u64 {
        match self {
            Self::Authorize { req_id, .. }
            | Self::TicksHistory { req_id, .. }
            | Self::Ping { req_id, .. } => *req_id,
        }
    }
}

/// Any message received FROM the Deriv API.
///
/// Every response carries `msg_type` and echoes `req_id`; exactly one of the
/// payload fields (or `error`) is populated.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub msg_type: String,
    #[serde(default)]
    pub req_id: Option<u64>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub authorize: Option<AuthorizeBody>,
    #[serde(default)]
    pub candles: Option<Vec<CandleBody>>,
    #[serde(default)]
    pub pong: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeBody {
    pub balance: Decimal,
    pub currency: String,
    pub loginid: String,
    #[serde(default)]
    pub is_virtual: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandleBody {
    pub epoch: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl InboundMessage {
    pub fn parse(text: &str) -> Result<Self, BrokerError> {
        serde_json::from_str(text)
            .map_err(|e| BrokerError::Protocol(format!("Deserialization error: {}", e)))
    }

    /// Fail with the API's own error, if it sent one.
    pub fn check(self) -> Result<Self, BrokerError> {
        match self.error {
            Some(err) => Err(BrokerError::Api {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self),
        }
    }

    pub fn into_account(self) -> Result<AccountInfo, BrokerError> {
        let body = self
            .check()?
            .authorize
            .ok_or_else(|| BrokerError::Protocol("authorize response without body".to_string()))?;
        Ok(AccountInfo {
            balance: body.balance,
            account_type: if body.is_virtual == 1 {
                AccountType::Demo
            } else {
                AccountType::Real
            },
            currency: body.currency,
            login_id: body.loginid,
        })
    }

    pub fn into_candles(self) -> Result<Vec<Candle>, BrokerError> {
        let bodies = self
            .check()?
            .candles
            .ok_or_else(|| BrokerError::Protocol("history response without candles".to_string()))?;
        bodies
            .into_iter()
            .map(|c| {
                let timestamp: DateTime<Utc> = Utc
                    .timestamp_opt(c.epoch, 0)
                    .single()
                    .ok_or_else(|| BrokerError::Protocol(format!("bad epoch {}", c.epoch)))?;
                Ok(Candle {
                    timestamp,
                    open: c.open,
                    high: c.high,
                    low: c.low,
                    close: c.close,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_authorize_request_shape() {
        let json = serde_json::to_value(OutboundMessage::authorize("abc", 1)).unwrap();
        assert_eq!(json, serde_json::json!({"authorize": "abc", "req_id": 1}));
    }

    #[test]
    fn test_history_request_shape() {
        let json = serde_json::to_value(OutboundMessage::candles("R_100", 300, 60, 7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ticks_history": "R_100",
                "end": "latest",
                "count": 60,
                "style": "candles",
                "granularity": 300,
                "req_id": 7
            })
        );
    }

    #[test]
    fn test_parse_authorize_response() {
        let text = r#"{
            "msg_type": "authorize",
            "req_id": 1,
            "echo_req": {"authorize": "<not shown>", "req_id": 1},
            "authorize": {
                "balance": 10000.5,
                "currency": "USD",
                "loginid": "VRTC123",
                "is_virtual": 1,
                "email": "x@example.com"
            }
        }"#;
        let account = InboundMessage::parse(text).unwrap().into_account().unwrap();
        assert_eq!(account.balance, dec!(10000.5));
        assert_eq!(account.account_type, AccountType::Demo);
        assert_eq!(account.login_id, "VRTC123");
    }

    #[test]
    fn test_parse_error_response() {
        let text = r#"{
            "msg_type": "authorize",
            "req_id": 1,
            "error": {"code": "InvalidToken", "message": "The token is invalid."}
        }"#;
        let err = InboundMessage::parse(text).unwrap().into_account().unwrap_err();
        match err {
            BrokerError::Api { code, .. } => assert_eq!(code, "InvalidToken"),
            other => panic!("Expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_candles_response() {
        let text = r#"{
            "msg_type": "candles",
            "req_id": 2,
            "candles": [
                {"epoch": 1700000000, "open": 1.1, "high": 1.3, "low": 1.0, "close": 1.2},
                {"epoch": 1700000300, "open": 1.2, "high": 1.25, "low": 1.15, "close": 1.18}
            ]
        }"#;
        let candles = InboundMessage::parse(text).unwrap().into_candles().unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, dec!(1.2));
        assert_eq!(candles[1].timestamp.timestamp(), 1_700_000_300);
    }

    #[test]
    fn test_missing_payload_is_protocol_error() {
        let text = r#"{"msg_type": "candles", "req_id": 3}"#;
        let err = InboundMessage::parse(text).unwrap().into_candles().unwrap_err();
        assert!(matches!(err, BrokerError::Protocol(_)));
    }
}
