use crate::connection::ConnectionPhase;
use crate::dashboard;
use crate::error::ApiError;
use crate::signal::{SignalRequest, StrategyInfo};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sniper_core::{AccountType, BotConfig, BotRecord, SignalPayload};
use std::sync::Arc;
use tracing::info;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // Page
        .route("/", get(dashboard_page))
        .route("/health", get(health_check))
        // Connection
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/status", get(status))
        // Signals
        .route("/signal", get(signal))
        .route("/strategies", get(list_strategies))
        // Bots
        .route("/bots", get(list_bots).post(create_bot))
        .route("/bots/{id}", get(get_bot).delete(delete_bot))
        .route("/bots/{id}/toggle", post(toggle_bot))
        .route("/bots/{id}/start", post(start_bot))
        .route("/bots/{id}/stop", post(stop_bot))
}

// ---------------------------------------------------------------------------
// Page & health
// ---------------------------------------------------------------------------

async fn dashboard_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(dashboard::dashboard_html(&state.config))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct TokenPayload {
    token: Option<String>,
}

/// Accepts the token as a JSON body `{"token": ...}` or as `?token=`.
/// The body wins when both are present.
async fn connect(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokenPayload>, QueryRejection>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(query) = query?;
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<TokenPayload>(&body)
            .map_err(|e| ApiError::Validation(format!("invalid JSON body: {}", e)))?
            .token
    };
    let token = from_body.or(query.token).unwrap_or_default();

    state.connection.submit_token(&token).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": "Connecting to broker",
    })))
}

async fn disconnect(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.connection.disconnect().await;
    Json(serde_json::json!({
        "ok": true,
        "message": "Disconnected",
    }))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    broker: String,
    phase: ConnectionPhase,
    is_connected: bool,
    is_authorized: bool,
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
    account_type: AccountType,
    currency: String,
    login_id: String,
    last_error: Option<String>,
    active_bots: Vec<BotRecord>,
    logs: Vec<String>,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let conn = state.connection.read_state().await;
    Json(StatusResponse {
        broker: state.connection.broker_name().to_string(),
        phase: conn.phase,
        is_connected: conn.connected,
        is_authorized: conn.authorized,
        balance: conn.account_info.balance,
        account_type: conn.account_info.account_type,
        currency: conn.account_info.currency,
        login_id: conn.account_info.login_id,
        last_error: conn.last_error,
        active_bots: state.bots.list_all().await,
        logs: state.activity.entries().await,
    })
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

async fn signal(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SignalRequest>, QueryRejection>,
) -> Result<Json<SignalPayload>, ApiError> {
    let Query(request) = query?;
    let payload = state.signals.get_signal(&state.connection, request).await?;
    Ok(Json(payload))
}

async fn list_strategies(State(state): State<Arc<AppState>>) -> Json<Vec<StrategyInfo>> {
    Json(state.signals.catalogue())
}

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

async fn list_bots(State(state): State<Arc<AppState>>) -> Json<Vec<BotRecord>> {
    Json(state.bots.list_all().await)
}

async fn create_bot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BotConfig>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(config) = payload?;
    let bot = state.bots.create(config).await;

    let total = state.bots.len().await;
    info!(
        bot_id = %bot.id,
        name = %bot.name,
        total = total,
        "Bot created"
    );
    state
        .activity
        .push(format!(
            "Bot '{}' created ({} {})",
            bot.name, bot.symbol, bot.timeframe
        ))
        .await;

    Ok((StatusCode::CREATED, Json(bot)))
}

async fn get_bot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BotRecord>, ApiError> {
    Ok(Json(state.bots.get(&id).await?))
}

async fn toggle_bot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BotRecord>, ApiError> {
    let bot = state.bots.toggle(&id).await?;
    log_activation(&state, &bot).await;
    Ok(Json(bot))
}

async fn start_bot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BotRecord>, ApiError> {
    let bot = state.bots.set_active(&id, true).await?;
    log_activation(&state, &bot).await;
    Ok(Json(bot))
}

async fn stop_bot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BotRecord>, ApiError> {
    let bot = state.bots.set_active(&id, false).await?;
    log_activation(&state, &bot).await;
    Ok(Json(bot))
}

async fn delete_bot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BotRecord>, ApiError> {
    let bot = state.bots.delete(&id).await?;
    info!(bot_id = %bot.id, "Bot deleted");
    state
        .activity
        .push(format!("Bot '{}' deleted", bot.name))
        .await;
    Ok(Json(bot))
}

async fn log_activation(state: &AppState, bot: &BotRecord) {
    let verb = if bot.is_active { "started" } else { "stopped" };
    info!(bot_id = %bot.id, active = bot.is_active, "Bot {}", verb);
    state
        .activity
        .push(format!("Bot '{}' {}", bot.name, verb))
        .await;
}
