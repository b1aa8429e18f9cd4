use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sniper_core::SignalError;

/// Every failure the HTTP surface can report.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("A connection is already active or in progress; disconnect first")]
    AlreadyConnected,
    #[error("Not authorized: connect with a valid token first")]
    Unauthorized,
    #[error("Not enough data yet: have {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },
    #[error("Bot not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Broker error: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AlreadyConnected | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InsufficientData { .. } | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable error name, returned alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::AlreadyConnected => "already_connected",
            ApiError::Unauthorized => "unauthorized",
            ApiError::InsufficientData { .. } => "insufficient_data",
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::Upstream(_) => "upstream_failure",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({
                "ok": false,
                "error": self.kind(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<SignalError> for ApiError {
    fn from(e: SignalError) -> Self {
        match e {
            SignalError::InsufficientData { have, need } => ApiError::InsufficientData { have, need },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::AlreadyConnected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InsufficientData { have: 3, need: 21 }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Upstream("boom".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_signal_error_conversion_keeps_counts() {
        let err: ApiError = SignalError::InsufficientData { have: 5, need: 21 }.into();
        assert_eq!(err.to_string(), "Not enough data yet: have 5 candles, need 21");
    }
}
