use crate::config::DashboardConfig;
use crate::connection::ConnectionHolder;
use crate::error::ApiError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sniper_core::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Query accepted by `/signal`. Missing fields fall back to the dashboard defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalRequest {
    pub symbol: Option<String>,
    #[serde(alias = "tf")]
    pub timeframe: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_candles: usize,
}

/// Turns a signal request into a fresh [`SignalPayload`]: authorization check,
/// candle fetch, generator call. Nothing is cached.
pub struct SignalService {
    generators: HashMap<String, Arc<dyn SignalGenerator>>,
    order: Vec<String>,
    default_symbol: String,
    default_timeframe: String,
    default_strategy: String,
    candle_count: usize,
}

impl SignalService {
    pub fn new(config: &DashboardConfig, generators: Vec<Arc<dyn SignalGenerator>>) -> Self {
        let order = generators.iter().map(|g| g.id().to_string()).collect();
        let generators = generators
            .into_iter()
            .map(|g| (g.id().to_string(), g))
            .collect();
        Self {
            generators,
            order,
            default_symbol: config.default_symbol.clone(),
            default_timeframe: config.default_timeframe.clone(),
            default_strategy: config.default_strategy.clone(),
            candle_count: config.candle_count,
        }
    }

    pub fn catalogue(&self) -> Vec<StrategyInfo> {
        self.order
            .iter()
            .filter_map(|id| self.generators.get(id))
            .map(|g| StrategyInfo {
                id: g.id().to_string(),
                name: g.name().to_string(),
                description: g.description().to_string(),
                min_candles: g.min_candles(),
            })
            .collect()
    }

    fn generator(&self, id: Option<&str>) -> Result<&Arc<dyn SignalGenerator>, ApiError> {
        let id = id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.default_strategy.as_str());
        self.generators
            .get(id)
            .ok_or_else(|| ApiError::Validation(format!("unknown strategy '{}'", id)))
    }

    pub async fn get_signal(
        &self,
        connection: &ConnectionHolder,
        request: SignalRequest,
    ) -> Result<SignalPayload, ApiError> {
        if !connection.is_authorized().await {
            return Err(ApiError::Unauthorized);
        }

        let symbol = request
            .symbol
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.default_symbol.clone());
        let timeframe: Timeframe = request
            .timeframe
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.default_timeframe.as_str())
            .parse::<Timeframe>()
            .map_err(|e: TimeframeError| ApiError::Validation(e.to_string()))?;
        let generator = self.generator(request.strategy.as_deref())?;

        let count = self.candle_count.max(generator.min_candles());
        let candles = connection.fetch_candles(&symbol, timeframe, count).await?;
        let signal = generator.generate(&candles)?;

        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            direction = %signal.direction,
            confidence = signal.confidence,
            "Signal computed"
        );

        let entry_time = candles
            .last()
            .map(|c| c.timestamp + timeframe.duration())
            .unwrap_or_else(Utc::now);

        Ok(SignalPayload {
            symbol,
            timeframe: timeframe.to_string(),
            direction: signal.direction,
            confidence: signal.confidence,
            trend: signal.trend,
            strategy_used: signal.strategy_used,
            entry_time,
            exit_time: entry_time + timeframe.duration(),
            indicator_status: signal.indicator_status,
            justification: signal.justification,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::activity::ActivityLog;
    use crate::connection::tests::wait_for_phase;
    use crate::connection::ConnectionPhase;
    use sniper_brokers_common::{SimulatedBrokerConfig, SimulatedBrokerFactory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always NEUTRAL; counts how often it was asked.
    pub(crate) struct CountingGenerator {
        pub calls: Arc<AtomicUsize>,
    }

    impl SignalGenerator for CountingGenerator {
        fn id(&self) -> &str {
            "counting"
        }
        fn name(&self) -> &str {
            "Counting"
        }
        fn description(&self) -> &str {
            "test generator"
        }
        fn min_candles(&self) -> usize {
            5
        }
        fn generate(&self, candles: &[Candle]) -> Result<StrategySignal, SignalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if candles.len() < 5 {
                return Err(SignalError::InsufficientData {
                    have: candles.len(),
                    need: 5,
                });
            }
            Ok(StrategySignal {
                direction: Direction::Neutral,
                confidence: 0,
                trend: Trend::Sideways,
                strategy_used: "Counting".to_string(),
                indicator_status: String::new(),
                justification: String::new(),
            })
        }
    }

    fn setup(broker: SimulatedBrokerConfig) -> (ConnectionHolder, SignalService, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = DashboardConfig {
            default_strategy: "counting".to_string(),
            ..Default::default()
        };
        let service = SignalService::new(
            &config,
            vec![Arc::new(CountingGenerator { calls: calls.clone() })],
        );
        let holder = ConnectionHolder::new(
            Arc::new(SimulatedBrokerFactory::new(broker)),
            Arc::new(ActivityLog::new()),
        );
        (holder, service, calls)
    }

    #[tokio::test]
    async fn test_unauthorized_never_calls_generator() {
        let (holder, service, calls) = setup(SimulatedBrokerConfig::default());
        let err = service
            .get_signal(&holder, SignalRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_payload_is_placed_in_time() {
        let (holder, service, calls) = setup(SimulatedBrokerConfig::default());
        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;

        let request = SignalRequest {
            symbol: Some("R_50".to_string()),
            timeframe: Some("60".to_string()),
            strategy: None,
        };
        let payload = service.get_signal(&holder, request).await.unwrap();
        assert_eq!(payload.symbol, "R_50");
        assert_eq!(payload.timeframe, "1m");
        assert_eq!(payload.exit_time - payload.entry_time, chrono::Duration::seconds(60));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_insufficient_history() {
        let (holder, service, _) = setup(SimulatedBrokerConfig {
            available_candles: 3,
            ..Default::default()
        });
        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;

        let err = service
            .get_signal(&holder, SignalRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InsufficientData { have: 3, need: 5 }));
    }

    #[tokio::test]
    async fn test_bad_timeframe_and_strategy() {
        let (holder, service, calls) = setup(SimulatedBrokerConfig::default());
        holder.submit_token("demo-token").await.unwrap();
        wait_for_phase(&holder, ConnectionPhase::Connected).await;

        let bad_tf = SignalRequest {
            timeframe: Some("7m".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.get_signal(&holder, bad_tf).await,
            Err(ApiError::Validation(_))
        ));

        let bad_strategy = SignalRequest {
            strategy: Some("martingale".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.get_signal(&holder, bad_strategy).await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_catalogue_lists_generators() {
        let service = SignalService::new(
            &DashboardConfig::default(),
            sniper_strategies::catalogue(),
        );
        let ids: Vec<String> = service.catalogue().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["sniper", "ema_rsi"]);
    }
}
