use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sniper_core::*;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the simulated broker.
#[derive(Debug, Clone)]
pub struct SimulatedBrokerConfig {
    /// Balance reported on authorization.
    pub initial_balance: Decimal,
    pub currency: String,
    pub account_type: AccountType,
    /// Delay applied to each handshake step, to make the connecting phase observable.
    pub handshake_delay: Duration,
    /// How many candles of history exist per symbol. Requests beyond this are truncated.
    pub available_candles: usize,
    /// Price level the synthetic series oscillates around.
    pub base_price: Decimal,
    /// Make `connect` fail, as if the endpoint were unreachable.
    pub fail_connect: bool,
    /// Delay applied to each candle request and ping.
    pub request_delay: Duration,
    /// Drop the transport on the request after this many succeeded.
    pub drop_after_requests: Option<usize>,
}

impl Default for SimulatedBrokerConfig {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::new(10_000, 0),
            currency: "USD".to_string(),
            account_type: AccountType::Demo,
            handshake_delay: Duration::ZERO,
            available_candles: 500,
            base_price: Decimal::new(1_000, 0),
            fail_connect: false,
            request_delay: Duration::ZERO,
            drop_after_requests: None,
        }
    }
}

/// An offline broker client.
///
/// Accepts any non-empty token that does not start with `invalid`, reports a
/// fixed demo account, and serves a deterministic synthetic candle series per
/// symbol so the dashboard can run without network access.
pub struct SimulatedBroker {
    config: SimulatedBrokerConfig,
    token: String,
    connected: bool,
    account: Option<AccountInfo>,
    requests: usize,
}

impl SimulatedBroker {
    pub fn new(config: SimulatedBrokerConfig, token: &str) -> Self {
        Self {
            config,
            token: token.to_string(),
            connected: false,
            account: None,
            requests: 0,
        }
    }

    /// Gate shared by candle requests and pings.
    async fn begin_request(&mut self) -> Result<(), BrokerError> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
        if self
            .config
            .drop_after_requests
            .is_some_and(|limit| self.requests >= limit)
        {
            self.connected = false;
            self.account = None;
            return Err(BrokerError::ConnectionFailed(
                "simulated connection dropped".to_string(),
            ));
        }
        self.requests += 1;
        Ok(())
    }

    async fn pause(&self) {
        if !self.config.handshake_delay.is_zero() {
            tokio::time::sleep(self.config.handshake_delay).await;
        }
    }

    /// Synthetic close at bar index `t`: two sine waves with a per-symbol phase.
    fn price_at(&self, symbol: &str, t: i64) -> Decimal {
        let phase = symbol.bytes().map(f64::from).sum::<f64>() / 10.0;
        let x = t as f64;
        let wave = 0.010 * (x * 0.31 + phase).sin() + 0.004 * (x * 1.7 + phase * 2.0).sin();
        let factor = Decimal::try_from(1.0 + wave).unwrap_or(Decimal::ONE);
        (self.config.base_price * factor).round_dp(4)
    }

    fn wick_at(&self, t: i64) -> Decimal {
        let size = 0.0015 * ((t as f64) * 2.3).sin().abs();
        (self.config.base_price * Decimal::try_from(size).unwrap_or(Decimal::ZERO)).round_dp(4)
    }

    fn synthesize(&self, symbol: &str, timeframe: Timeframe, count: usize) -> Vec<Candle> {
        let step = i64::from(timeframe.as_secs());
        let last_index = Utc::now().timestamp() / step;
        let first_index = last_index - count as i64 + 1;

        (first_index..=last_index)
            .filter_map(|t| {
                let open = self.price_at(symbol, t - 1);
                let close = self.price_at(symbol, t);
                let timestamp: DateTime<Utc> = Utc.timestamp_opt(t * step, 0).single()?;
                Some(Candle {
                    timestamp,
                    open,
                    high: open.max(close) + self.wick_at(t),
                    low: open.min(close) - self.wick_at(t + 7),
                    close,
                })
            })
            .collect()
    }
}

#[async_trait]
impl BrokerClient for SimulatedBroker {
    async fn connect(&mut self) -> Result<(), BrokerError> {
        self.pause().await;
        if self.config.fail_connect {
            return Err(BrokerError::ConnectionFailed(
                "simulated endpoint unreachable".to_string(),
            ));
        }
        self.connected = true;
        debug!("Simulated broker connected");
        Ok(())
    }

    async fn authorize(&mut self) -> Result<AccountInfo, BrokerError> {
        if !self.connected {
            return Err(BrokerError::NotConnected);
        }
        self.pause().await;
        if self.token.trim().is_empty() || self.token.starts_with("invalid") {
            return Err(BrokerError::AuthorizationFailed(
                "The token is invalid.".to_string(),
            ));
        }
        let account = AccountInfo {
            balance: self.config.initial_balance,
            account_type: self.config.account_type,
            currency: self.config.currency.clone(),
            login_id: "VRTC0000001".to_string(),
        };
        info!(login_id = %account.login_id, "Simulated broker authorized");
        self.account = Some(account.clone());
        Ok(account)
    }

    async fn disconnect(&mut self) -> Result<(), BrokerError> {
        self.connected = false;
        self.account = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn ping(&mut self) -> Result<(), BrokerError> {
        self.begin_request().await
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
        if self.connected && self.account.is_none() {
            return Err(BrokerError::NotAuthorized);
        }
        self.begin_request().await?;
        let count = count.min(self.config.available_candles);
        Ok(self.synthesize(symbol, timeframe, count))
    }
}

/// Hands out [`SimulatedBroker`] clients sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBrokerFactory {
    pub config: SimulatedBrokerConfig,
}

impl SimulatedBrokerFactory {
    pub fn new(config: SimulatedBrokerConfig) -> Self {
        Self { config }
    }
}

impl BrokerFactory for SimulatedBrokerFactory {
    fn create(&self, token: &str) -> Box<dyn BrokerClient> {
        Box::new(SimulatedBroker::new(self.config.clone(), token))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
