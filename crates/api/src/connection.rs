use crate::activity::ActivityLog;
use crate::error::ApiError;
use serde::Serialize;
use sniper_core::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where the broker handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Snapshot of the broker connection as seen by the status endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    pub connected: bool,
    pub authorized: bool,
    pub account_info: AccountInfo,
    pub last_error: Option<String>,
}

type SharedClient = Arc<Mutex<Option<Box<dyn BrokerClient>>>>;

pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(30);

/// Owns the single broker connection of the process.
///
/// A submitted token starts a background handshake task; the HTTP call
/// returns as soon as the task is spawned. The task publishes progress into
/// the shared [`ConnectionState`], which `/status` reads on every poll.
/// Once connected, the same task pings the broker every keepalive interval
/// so an idle transport is neither closed by the server nor lost unnoticed.
pub struct ConnectionHolder {
    factory: Arc<dyn BrokerFactory>,
    state: Arc<RwLock<ConnectionState>>,
    client: SharedClient,
    task: Mutex<Option<JoinHandle<()>>>,
    activity: Arc<ActivityLog>,
    keepalive: Option<Duration>,
}

impl ConnectionHolder {
    pub fn new(factory: Arc<dyn BrokerFactory>, activity: Arc<ActivityLog>) -> Self {
        Self {
            factory,
            state: Arc::new(RwLock::new(ConnectionState::default())),
            client: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
            activity,
            keepalive: Some(DEFAULT_KEEPALIVE),
        }
    }

    /// Set the ping interval while connected; `None` disables pinging.
    pub fn with_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.keepalive = interval.filter(|d| !d.is_zero());
        self
    }

    pub fn broker_name(&self) -> &str {
        self.factory.name()
    }

    /// Start connecting with `token`.
    ///
    /// Rejected with `AlreadyConnected`, leaving state untouched, while a
    /// handshake is in flight or a connection is established.
    pub async fn submit_token(&self, token: &str) -> Result<(), ApiError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::Validation("token must not be empty".to_string()));
        }

        {
            let mut state = self.state.write().await;
            if matches!(
                state.phase,
                ConnectionPhase::Connecting | ConnectionPhase::Connected
            ) {
                return Err(ApiError::AlreadyConnected);
            }
            *state = ConnectionState {
                phase: ConnectionPhase::Connecting,
                ..Default::default()
            };
        }

        *self.client.lock().await = Some(self.factory.create(token));

        info!(broker = self.factory.name(), "Token submitted, starting handshake");
        self.activity.push("Token received, connecting to broker...").await;

        let state = self.state.clone();
        let client = self.client.clone();
        let activity = self.activity.clone();
        let keepalive = self.keepalive;
        let handle = tokio::spawn(async move {
            if run_handshake(&state, &client, &activity).await {
                if let Some(interval) = keepalive {
                    run_keepalive(&state, &client, &activity, interval).await;
                }
            }
        });
        if let Some(previous) = self.task.lock().await.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    pub async fn read_state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    pub async fn is_authorized(&self) -> bool {
        self.state.read().await.authorized
    }

    /// Pull candle history through the held client.
    ///
    /// A transport failure that leaves the client disconnected moves the
    /// holder to `Failed`, so the dashboard offers a fresh connect. The
    /// demotion is written before the client lock is released, so it can
    /// never land on top of a disconnect or a newer connection.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        if !self.is_authorized().await {
            return Err(ApiError::Unauthorized);
        }

        let mut guard = self.client.lock().await;
        let client = guard.as_mut().ok_or(ApiError::Unauthorized)?;

        let result = client.candles(symbol, timeframe, count).await;
        let still_connected = client.is_connected();
        match result {
            Ok(candles) => Ok(candles),
            Err(e) => {
                warn!(symbol, error = %e, "Candle request failed");
                if !still_connected {
                    demote(&self.state, &self.activity, guard, &e).await;
                }
                Err(ApiError::Upstream(e.to_string()))
            }
        }
    }

    /// Abort any handshake, close the client and return to `Disconnected`.
    pub async fn disconnect(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
        let client = self.client.lock().await.take();
        if let Some(mut client) = client {
            if let Err(e) = client.disconnect().await {
                warn!(error = %e, "Error while closing broker client");
            }
            self.activity.push("Disconnected from broker").await;
        }
        *self.state.write().await = ConnectionState::default();
        info!("Broker connection reset");
    }

    /// Called once when the server stops.
    pub async fn shutdown(&self) {
        info!("Shutting down broker connection");
        self.disconnect().await;
    }
}

/// Drop a client whose transport is gone and move a live connection to
/// `Failed`. Takes the client guard so the state write happens under it.
async fn demote(
    state: &RwLock<ConnectionState>,
    activity: &ActivityLog,
    mut guard: MutexGuard<'_, Option<Box<dyn BrokerClient>>>,
    error: &BrokerError,
) {
    *guard = None;
    {
        let mut s = state.write().await;
        if s.phase != ConnectionPhase::Connected {
            return;
        }
        *s = ConnectionState {
            phase: ConnectionPhase::Failed,
            last_error: Some(error.to_string()),
            ..Default::default()
        };
    }
    drop(guard);
    activity.push(format!("Connection lost: {}", error)).await;
}

/// The background handshake. Holds the client lock throughout, so signal
/// requests short-circuit on the `authorized` flag rather than queueing here.
/// Returns whether the connection was established.
async fn run_handshake(
    state: &RwLock<ConnectionState>,
    client: &SharedClient,
    activity: &ActivityLog,
) -> bool {
    let mut guard = client.lock().await;
    let Some(broker) = guard.as_mut() else {
        return false;
    };

    let outcome = async {
        broker.connect().await?;
        {
            let mut s = state.write().await;
            s.connected = true;
        }
        activity.push("Connected, authorizing token...").await;
        broker.authorize().await
    }
    .await;

    match outcome {
        Ok(account) => {
            info!(
                login_id = %account.login_id,
                account_type = %account.account_type,
                "Broker handshake complete"
            );
            activity
                .push(format!(
                    "Authorized {} ({} account, balance {} {})",
                    account.login_id, account.account_type, account.balance, account.currency
                ))
                .await;
            let mut s = state.write().await;
            s.phase = ConnectionPhase::Connected;
            s.connected = true;
            s.authorized = true;
            s.account_info = account;
            true
        }
        Err(e) => {
            warn!(error = %e, "Broker handshake failed");
            if let Some(mut broker) = guard.take() {
                let _ = broker.disconnect().await;
            }
            drop(guard);
            activity.push(format!("Connection failed: {}", e)).await;
            *state.write().await = ConnectionState {
                phase: ConnectionPhase::Failed,
                last_error: Some(e.to_string()),
                ..Default::default()
            };
            false
        }
    }
}

/// Ping the held client every `interval` until it is gone.
async fn run_keepalive(
    state: &RwLock<ConnectionState>,
    client: &SharedClient,
    activity: &ActivityLog,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let mut guard = client.lock().await;
        let Some(broker) = guard.as_mut() else {
            return;
        };
        let result = broker.ping().await;
        let still_connected = broker.is_connected();
        match result {
            Ok(()) => debug!("Keepalive ping answered"),
            Err(e) if !still_connected => {
                warn!(error = %e, "Keepalive ping lost the connection");
                demote(state, activity, guard, &e).await;
                return;
            }
            Err(e) => warn!(error = %e, "Keepalive ping failed"),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sniper_brokers_common::{SimulatedBrokerConfig, SimulatedBrokerFactory};
    use std::time::Duration;

    pub(crate) async fn wait_for_phase(holder: &ConnectionHolder, phase: ConnectionPhase) -> ConnectionState {
        for _ in 0..200 {
            let state = holder.read_state().await;
            if state.phase == phase {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Timed out waiting for phase {:?}", phase);
    }

    fn holder(config: SimulatedBrokerConfig) -> ConnectionHolder {
        ConnectionHolder::new(
            Arc::new(SimulatedBrokerFactory::new(config)),
            Arc::new(ActivityLog::new()),
        )
    }

    #[tokio::test]
    async fn test_initial_state_is_disconnected() {
        let holder = holder(SimulatedBrokerConfig::default());
        let state = holder.read_state().await;
        assert_eq!(state, ConnectionState::default());
        assert!(!state.connected);
        assert!(!state.authorized);
    }

    #[tokio::test]
    async fn test_token_connects_in_background() {
        let holder = holder(SimulatedBrokerConfig::default());
        holder.submit_token("demo-token").await.unwrap();

        let state = wait_for_phase(&holder, ConnectionPhase::Connected).await;
        assert!(state.connected);
        assert!(state.authorized);
        assert_eq!(state.account_info.balance, dec!(10000));
        assert_eq!(state.account_info.account_type, AccountType::Demo);
    }

    #[tokio::test]
    async fn test_submit_returns_before_handshake_completes() {
        let holder = holder(SimulatedBrokerConfig {
            handshake_delay: Duration::from_millis(200),
            ..Default::default()
        });
        holder.submit_token("demo-token").await.unwrap();

        let state = holder.read_state().await;
        assert_eq!(state.phase, ConnectionPhase::Connecting);
        assert!(!state.authorized);
    }

    #[tokio::test]
    async fn test_second_token_rejected_while_connecting() {
        let holder = holder(SimulatedBrokerConfig {
            handshake_delay: Duration::from_millis(200),
            ..Default::default()
        });
        holder.submit_token("first").await.unwrap();
        let before = holder.read_state().await;

        let err = holder.submit_token("second").await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyConnected));
        assert_eq!(holder.read_state().await, before);
    }

    #[tokio::test]
    async fn test_second_token_rejected_while_connected() {
        let holder = holder(SimulatedBrokerConfig::default());
        holder.submit_token("first").await.unwrap();
        let before = wait_for_phase(&holder, ConnectionPhase::Connected).await;

        let err = holder.submit_token("second").await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyConnected));
        assert_eq!(holder.read_state().await, before);
    }

    #[tokio::test]
    async fn test_invalid_token_fails_and_allows_retry() {
        let holder = holder(SimulatedBrokerConfig::default());
        holder.submit_token("invalid-token").await.unwrap();

        let state = wait_for_phase(&holder, ConnectionPhase::Failed).await;
        assert!(!state.connected);
        assert!(state.last_error.unwrap().contains("invalid"));

        holder.submit_token("good-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let holder = holder(SimulatedBrokerConfig {
            fail_connect: true,
            ..Default::default()
        });
        holder.submit_token("demo-token").await.unwrap();
        let state = wait_for_phase(&holder, ConnectionPhase::Failed).await;
        assert!(state.last_error.unwrap().contains("unreachable"));
    }

    #[tokio::test]
    async fn test_empty_token_is_validation_error() {
        let holder = holder(SimulatedBrokerConfig::default());
        let err = holder.submit_token("   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(holder.read_state().await.phase, ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_aborts_handshake_and_allows_reconnect() {
        let holder = holder(SimulatedBrokerConfig {
            handshake_delay: Duration::from_millis(500),
            ..Default::default()
        });
        holder.submit_token("demo-token").await.unwrap();
        holder.disconnect().await;
        assert_eq!(holder.read_state().await, ConnectionState::default());

        holder.submit_token("demo-token").await.unwrap();
        assert_eq!(holder.read_state().await.phase, ConnectionPhase::Connecting);
    }

    #[tokio::test]
    async fn test_fetch_candles_requires_authorization() {
        let holder = holder(SimulatedBrokerConfig::default());
        let err = holder.fetch_candles("R_100", Timeframe::M1, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));

        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;
        let candles = holder.fetch_candles("R_100", Timeframe::M1, 10).await.unwrap();
        assert_eq!(candles.len(), 10);
    }

    #[tokio::test]
    async fn test_lost_fetch_does_not_clobber_a_newer_connection() {
        let holder = Arc::new(
            holder(SimulatedBrokerConfig {
                handshake_delay: Duration::from_millis(50),
                request_delay: Duration::from_millis(100),
                drop_after_requests: Some(0),
                ..Default::default()
            })
            .with_keepalive(None),
        );
        holder.submit_token("first").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;

        let fetching = tokio::spawn({
            let holder = holder.clone();
            async move { holder.fetch_candles("R_100", Timeframe::M1, 10).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // waits for the in-flight request, which loses the transport
        holder.disconnect().await;
        holder.submit_token("second").await.unwrap();

        let err = fetching.await.unwrap().unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));

        let state = holder.read_state().await;
        assert_eq!(state.phase, ConnectionPhase::Connecting);
        assert_eq!(state.last_error, None);
        assert!(matches!(
            holder.submit_token("third").await,
            Err(ApiError::AlreadyConnected)
        ));

        let state = wait_for_phase(&holder, ConnectionPhase::Connected).await;
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn test_keepalive_notices_dropped_transport() {
        let holder = holder(SimulatedBrokerConfig {
            drop_after_requests: Some(2),
            ..Default::default()
        })
        .with_keepalive(Some(Duration::from_millis(50)));
        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;

        // two pings answered, the third finds the transport gone
        let state = wait_for_phase(&holder, ConnectionPhase::Failed).await;
        assert!(!state.authorized);
        assert!(state.last_error.unwrap().contains("dropped"));

        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;
    }

    #[tokio::test]
    async fn test_without_keepalive_loss_shows_on_next_fetch() {
        let holder = holder(SimulatedBrokerConfig {
            drop_after_requests: Some(0),
            ..Default::default()
        })
        .with_keepalive(None);
        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(holder.read_state().await.phase, ConnectionPhase::Connected);

        let err = holder.fetch_candles("R_100", Timeframe::M1, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
        let state = holder.read_state().await;
        assert_eq!(state.phase, ConnectionPhase::Failed);
        assert!(!state.authorized);

        let err = holder.fetch_candles("R_100", Timeframe::M1, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_simultaneous_tokens_admit_exactly_one() {
        let holder = Arc::new(holder(SimulatedBrokerConfig {
            handshake_delay: Duration::from_millis(50),
            ..Default::default()
        }));

        let submit = |token: &'static str| {
            let holder = holder.clone();
            tokio::spawn(async move { holder.submit_token(token).await })
        };
        let (a, b) = tokio::join!(submit("first"), submit("second"));
        let results = [a.unwrap(), b.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(ApiError::AlreadyConnected))));
        wait_for_phase(&holder, ConnectionPhase::Connected).await;
    }
}
