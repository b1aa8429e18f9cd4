use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use sniper_core::*;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::protocol::*;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration for connecting to the Deriv WebSocket API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivConfig {
    /// WebSocket endpoint without query string.
    pub endpoint: String,
    /// Registered application id, sent as `?app_id=`.
    pub app_id: String,
    /// How long to wait for the response to a single request.
    pub request_timeout_secs: u64,
}

impl Default for DerivConfig {
    fn default() -> Self {
        Self {
            endpoint: "wss://ws.derivws.com/websockets/v3".to_string(),
            app_id: "1089".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl DerivConfig {
    pub fn url(&self) -> String {
        format!("{}?app_id={}", self.endpoint, self.app_id)
    }
}

/// Deriv API client bound to one API token.
pub struct DerivClient {
    config: DerivConfig,
    token: String,
    stream: Option<WsStream>,
    next_req_id: u64,
    account: Option<AccountInfo>,
}

impl DerivClient {
    pub fn new(config: DerivConfig, token: &str) -> Self {
        Self {
            config,
            token: token.to_string(),
            stream: None,
            next_req_id: 1,
            account: None,
        }
    }

    fn take_req_id(&mut self) -> u64 {
        let id = self.next_req_id;
        self.next_req_id += 1;
        id
    }

    /// Forget the transport after a fatal error so `is_connected` reflects it.
    fn drop_stream(&mut self, reason: &str) -> BrokerError {
        warn!(reason, "Deriv connection lost");
        self.stream = None;
        self.account = None;
        BrokerError::ConnectionFailed(reason.to_string())
    }

    /// Send a request and wait for the response carrying the same `req_id`.
    /// Unrelated messages (e.g. subscription pushes) are skipped.
    async fn request(&mut self, msg: OutboundMessage) -> Result<InboundMessage, BrokerError> {
        let req_id = msg.req_id();
        let json = serde_json::to_string(&msg)
            .map_err(|e| BrokerError::Protocol(format!("Serialization error: {}", e)))?;
        let timeout = Duration::from_secs(self.config.request_timeout_secs);

        let stream = self.stream.as_mut().ok_or(BrokerError::NotConnected)?;
        if let Err(e) = stream.send(Message::Text(json)).await {
            return Err(self.drop_stream(&format!("Write error: {}", e)));
        }

        let outcome = tokio::time::timeout(timeout, async move {
            loop {
                match stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        let inbound = InboundMessage::parse(&text)?;
                        if inbound.req_id == Some(req_id) {
                            return Ok(inbound);
                        }
                        debug!(msg_type = %inbound.msg_type, "Skipping unrelated message");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        return Err(BrokerError::ConnectionFailed(format!(
                            "Closed by server: {:?}",
                            frame
                        )));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(BrokerError::ConnectionFailed(format!("Read error: {}", e)));
                    }
                    None => {
                        return Err(BrokerError::ConnectionFailed("Stream ended".to_string()));
                    }
                }
            }
        })
        .await;

        match outcome {
            Ok(Ok(inbound)) => Ok(inbound),
            Ok(Err(BrokerError::ConnectionFailed(reason))) => Err(self.drop_stream(&reason)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BrokerError::Timeout(format!("response to request {}", req_id))),
        }
    }
}

#[async_trait]
impl BrokerClient for DerivClient {
    async fn connect(&mut self) -> Result<(), BrokerError> {
        let url = self.config.url();
        info!(endpoint = %self.config.endpoint, "Connecting to Deriv");

        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| BrokerError::ConnectionFailed(format!("WebSocket connect failed: {}", e)))?;

        self.stream = Some(stream);
        info!("Connected to Deriv");
        Ok(())
    }

    async fn authorize(&mut self) -> Result<AccountInfo, BrokerError> {
        let req_id = self.take_req_id();
        let token = self.token.clone();
        let response = self.request(OutboundMessage::authorize(&token, req_id)).await?;

        let account = response.into_account().map_err(|e| match e {
            BrokerError::Api { code, message } => {
                BrokerError::AuthorizationFailed(format!("{}: {}", code, message))
            }
            other => other,
        })?;

        info!(
            login_id = %account.login_id,
            account_type = %account.account_type,
            "Authorized with Deriv"
        );
        self.account = Some(account.clone());
        Ok(account)
    }

    async fn disconnect(&mut self) -> Result<(), BrokerError> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
        self.account = None;
        info!("Disconnected from Deriv");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn ping(&mut self) -> Result<(), BrokerError> {
        let req_id = self.take_req_id();
        let response = self.request(OutboundMessage::ping(req_id)).await?.check()?;
        match response.pong.as_deref() {
            Some("pong") => Ok(()),
            other => Err(BrokerError::Protocol(format!("unexpected ping reply: {:?}", other))),
        }
    }

    fn is_authorized(&self) -> bool {
        self.account.is_some()
    }

    fn account_info(&self) -> Option<AccountInfo> {
        self.account.clone()
    }

    async fn candles(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, BrokerError> {
        if self.account.is_none() {
            return Err(BrokerError::NotAuthorized);
        }
        let req_id = self.take_req_id();
        let msg = OutboundMessage::candles(symbol, timeframe.as_secs(), count, req_id);
        let candles = self.request(msg).await?.into_candles()?;
        debug!(symbol, timeframe = %timeframe, count = candles.len(), "Fetched candle history");
        Ok(candles)
    }
}

/// Creates [`DerivClient`]s for submitted tokens.
#[derive(Debug, Clone, Default)]
pub struct DerivClientFactory {
    pub config: DerivConfig,
}

impl DerivClientFactory {
    pub fn new(config: DerivConfig) -> Self {
        Self { config }
    }
}

impl BrokerFactory for DerivClientFactory {
    fn create(&self, token: &str) -> Box<dyn BrokerClient> {
        Box::new(DerivClient::new(self.config.clone(), token))
    }

    fn name(&self) -> &str {
        "deriv"
    }
}
