use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sniper_core::*;
use sniper_indicators::{bollinger, ema, rsi, sma};
use tracing::debug;

/// Candle-anatomy engine that looks for exhaustion reversals first and
/// strong momentum candles second.
///
/// 1. **Sniper Elite** (99%): RSI beyond an extreme, price piercing a
///    Bollinger band and a rejection wick at least `wick_ratio` of the body.
/// 2. **Momentum Flow** (85%): a body more than `momentum_body_ratio` times
///    the combined wicks, closing through the EMA without RSI being stretched.
/// 3. Otherwise NEUTRAL.
#[derive(Debug, Clone)]
pub struct SniperStrategy {
    config: SniperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniperConfig {
    pub rsi_period: usize,
    pub band_period: usize,
    pub band_std: Decimal,
    pub ema_period: usize,
    pub overbought: Decimal,
    pub oversold: Decimal,
    pub wick_ratio: Decimal,
    pub momentum_body_ratio: Decimal,
    /// Momentum CALLs require RSI below this.
    pub momentum_rsi_ceiling: Decimal,
    /// Momentum PUTs require RSI above this.
    pub momentum_rsi_floor: Decimal,
}

impl Default for SniperConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            band_period: 20,
            band_std: Decimal::TWO,
            ema_period: 10,
            overbought: dec!(78),
            oversold: dec!(22),
            wick_ratio: dec!(0.8),
            momentum_body_ratio: dec!(2.5),
            momentum_rsi_ceiling: dec!(65),
            momentum_rsi_floor: dec!(35),
        }
    }
}

const ELITE: &str = "Sniper Elite";
const MOMENTUM: &str = "Momentum Flow";

impl SniperStrategy {
    pub fn new(config: SniperConfig) -> Self {
        Self { config }
    }

    fn signal(
        direction: Direction,
        confidence: u8,
        trend: Trend,
        strategy: &str,
        indicator_status: String,
        justification: &str,
    ) -> StrategySignal {
        StrategySignal {
            direction,
            confidence,
            trend,
            strategy_used: strategy.to_string(),
            indicator_status,
            justification: justification.to_string(),
        }
    }
}

impl SignalGenerator for SniperStrategy {
    fn id(&self) -> &str {
        "sniper"
    }

    fn name(&self) -> &str {
        "Sniper"
    }

    fn description(&self) -> &str {
        "Exhaustion rejections at the Bollinger bands, then momentum candles through the EMA"
    }

    fn min_candles(&self) -> usize {
        let c = &self.config;
        c.band_period.max(c.rsi_period + 1).max(c.ema_period) + 1
    }

    fn generate(&self, candles: &[Candle]) -> Result<StrategySignal, SignalError> {
        let need = self.min_candles();
        let last = match candles.last() {
            Some(c) if candles.len() >= need => c,
            _ => {
                return Err(SignalError::InsufficientData {
                    have: candles.len(),
                    need,
                })
            }
        };

        let c = &self.config;
        let closes: Vec<Decimal> = candles.iter().map(|k| k.close).collect();
        let insufficient = || SignalError::InsufficientData {
            have: candles.len(),
            need,
        };
        let bands = bollinger(&closes, c.band_period, c.band_std).ok_or_else(insufficient)?;
        let ema_val = ema(&closes, c.ema_period).ok_or_else(insufficient)?;
        let sma_val = sma(&closes, c.band_period).ok_or_else(insufficient)?;
        // None here means a flat window: the length was checked above
        let rsi_val = rsi(&closes, c.rsi_period);

        let trend = Trend::from_lines(ema_val, sma_val);
        let status = format!(
            "RSI({}) {} | EMA({}) {} | BB({},{}) {} / {}",
            c.rsi_period,
            rsi_val.map_or_else(|| "n/a".to_string(), |r| r.round_dp(2).to_string()),
            c.ema_period,
            ema_val.round_dp(5),
            c.band_period,
            c.band_std,
            bands.upper.round_dp(5),
            bands.lower.round_dp(5),
        );

        let body = last.body();
        let upper_wick = last.upper_wick();
        let lower_wick = last.lower_wick();

        debug!(
            rsi = ?rsi_val,
            ema = %ema_val,
            body = %body,
            upper_wick = %upper_wick,
            lower_wick = %lower_wick,
            "Evaluating sniper candle"
        );

        let Some(rsi_val) = rsi_val else {
            return Ok(Self::signal(
                Direction::Neutral,
                0,
                trend,
                "None",
                status,
                "Flat RSI window, no momentum to read",
            ));
        };

        if rsi_val > c.overbought && last.high >= bands.upper && upper_wick > body * c.wick_ratio {
            return Ok(Self::signal(
                Direction::Put,
                99,
                trend,
                ELITE,
                status,
                "Extreme rejection at the top of the band",
            ));
        }

        if rsi_val < c.oversold && last.low <= bands.lower && lower_wick > body * c.wick_ratio {
            return Ok(Self::signal(
                Direction::Call,
                99,
                trend,
                ELITE,
                status,
                "Exhaustion support hit at the bottom of the band",
            ));
        }

        if body > (upper_wick + lower_wick) * c.momentum_body_ratio {
            if last.is_bullish() && last.close > ema_val && rsi_val < c.momentum_rsi_ceiling {
                return Ok(Self::signal(
                    Direction::Call,
                    85,
                    trend,
                    MOMENTUM,
                    status,
                    "Strong bullish candle breaking above the average",
                ));
            }
            if last.is_bearish() && last.close < ema_val && rsi_val > c.momentum_rsi_floor {
                return Ok(Self::signal(
                    Direction::Put,
                    85,
                    trend,
                    MOMENTUM,
                    status,
                    "Strong bearish candle breaking below the average",
                ));
            }
        }

        Ok(Self::signal(
            Direction::Neutral,
            0,
            trend,
            "None",
            status,
            "No sniper or momentum pattern on the last candle, waiting",
        ))
    }
}
