use crate::models::*;
use crate::timeframe::Timeframe;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Broker Client Trait
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Not authorized")]
    NotAuthorized,
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),
    #[error("Broker API error [{code}]: {message}")]
    Api { code: String, message: String },
    #[error("Timed out waiting for {0}")]
    Timeout(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// A connection to the broker's market-data API, bound to one token.
///
/// The handshake is split in two so callers can observe progress:
/// `connect` opens the transport, `authorize` presents the token.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Open the transport.
    async fn connect(&mut self) -> Result<(), BrokerError>;

    /// Present the token and return the account it unlocks.
    async fn authorize(&mut self) -> Result<AccountInfo, BrokerError>;

    /// Close the transport. Safe to call when already closed.
    async fn disconnect(&mut self) -> Result<(), BrokerError>;

    fn is_connected(&self) -> bool;

    fn is_authorized(&self) -> bool;

    /// Account details from the last successful authorization.
    fn account_info(&self) -> Option<AccountInfo>;

    /// Cheap round-trip that keeps an idle transport open.
    async fn ping(&mut self) -> Result<(), BrokerError>;

    /// Fetch up to `count` most recent candles, oldest first.
    async fn candles(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, BrokerError>;

    /// Full handshake: connect, then authorize.
    async fn start(&mut self) -> Result<AccountInfo, BrokerError> {
        self.connect().await?;
        self.authorize().await
    }
}

/// Builds a fresh, unconnected client for a submitted token.
pub trait BrokerFactory: Send + Sync {
    fn create(&self, token: &str) -> Box<dyn BrokerClient>;

    /// Short label for logs (e.g. "deriv", "simulated").
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Signal Generator Trait
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("Not enough data yet: have {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },
}

/// A pure function from candle history to a directional signal.
pub trait SignalGenerator: Send + Sync {
    /// Stable identifier used in query strings (e.g. "sniper").
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Minimum candles required before a signal can be produced.
    fn min_candles(&self) -> usize;

    /// Evaluate the latest candle in `candles` (oldest first).
    fn generate(&self, candles: &[Candle]) -> Result<StrategySignal, SignalError>;
}
