use crate::activity::ActivityLog;
use crate::bots::BotRegistry;
use crate::config::DashboardConfig;
use crate::connection::ConnectionHolder;
use crate::signal::SignalService;
use sniper_core::{BrokerFactory, SignalGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state accessible by all route handlers.
pub struct AppState {
    pub config: DashboardConfig,
    pub connection: ConnectionHolder,
    pub bots: BotRegistry,
    pub signals: SignalService,
    /// Shared with the connection holder, which logs handshake progress.
    pub activity: Arc<ActivityLog>,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        factory: Arc<dyn BrokerFactory>,
        generators: Vec<Arc<dyn SignalGenerator>>,
    ) -> Self {
        let activity = Arc::new(ActivityLog::new());
        Self {
            connection: ConnectionHolder::new(factory, activity.clone())
                .with_keepalive(Some(Duration::from_secs(config.keepalive_secs))),
            bots: BotRegistry::new(),
            signals: SignalService::new(&config, generators),
            activity,
            config,
        }
    }

    /// State wired to the built-in strategy catalogue.
    pub fn with_defaults(config: DashboardConfig, factory: Arc<dyn BrokerFactory>) -> Self {
        Self::new(config, factory, sniper_strategies::catalogue())
    }

    /// Close the broker connection before the process exits.
    pub async fn shutdown(&self) {
        self.connection.shutdown().await;
    }
}
