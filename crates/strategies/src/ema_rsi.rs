use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sniper_core::*;
use sniper_indicators::{split_rsi, trailing_ema};

/// EMA trend filter confirmed by RSI.
///
/// Each EMA runs over its own trailing window (`fast_period` and
/// `slow_period` closes), seeded at the first close of that window. RSI is
/// [`split_rsi`] over the whole history and reads neutral (50) until there
/// are `rsi_period + 1` closes.
///
/// CALL when the fast EMA is above the slow EMA and RSI is above `call_rsi`;
/// PUT when below and RSI is under `put_rsi`. Confidence starts at
/// `base_confidence` and grows one point per RSI point past the threshold.
#[derive(Debug, Clone)]
pub struct EmaRsiStrategy {
    config: EmaRsiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaRsiConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub rsi_period: usize,
    pub call_rsi: Decimal,
    pub put_rsi: Decimal,
    pub base_confidence: Decimal,
    /// Fewest closes a signal is computed from.
    pub min_history: usize,
}

impl Default for EmaRsiConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 30,
            rsi_period: 14,
            call_rsi: dec!(55),
            put_rsi: dec!(45),
            base_confidence: dec!(65),
            min_history: 10,
        }
    }
}

impl EmaRsiStrategy {
    pub fn new(config: EmaRsiConfig) -> Self {
        Self { config }
    }
}

fn clamp_confidence(value: Decimal) -> u8 {
    value
        .round()
        .max(Decimal::ZERO)
        .min(Decimal::ONE_HUNDRED)
        .to_u8()
        .unwrap_or(0)
}

impl SignalGenerator for EmaRsiStrategy {
    fn id(&self) -> &str {
        "ema_rsi"
    }

    fn name(&self) -> &str {
        "EMA + RSI"
    }

    fn description(&self) -> &str {
        "Fast/slow EMA trend direction confirmed by RSI momentum"
    }

    fn min_candles(&self) -> usize {
        self.config.min_history.max(1)
    }

    fn generate(&self, candles: &[Candle]) -> Result<StrategySignal, SignalError> {
        let need = self.min_candles();
        let insufficient = || SignalError::InsufficientData {
            have: candles.len(),
            need,
        };
        if candles.len() < need {
            return Err(insufficient());
        }

        let c = &self.config;
        let closes: Vec<Decimal> = candles.iter().map(|k| k.close).collect();
        let fast = trailing_ema(&closes, c.fast_period).ok_or_else(insufficient)?;
        let slow = trailing_ema(&closes, c.slow_period).ok_or_else(insufficient)?;
        let r = split_rsi(&closes, c.rsi_period).unwrap_or(dec!(50));

        let indicator_status = format!(
            "EMA({}) {} | EMA({}) {} | RSI({}) {}",
            c.fast_period,
            fast.round_dp(5),
            c.slow_period,
            slow.round_dp(5),
            c.rsi_period,
            r.round_dp(2),
        );
        let trend = Trend::from_lines(fast, slow);

        let (direction, confidence, justification) = if fast > slow && r > c.call_rsi {
            (
                Direction::Call,
                clamp_confidence(c.base_confidence + (r - c.call_rsi)),
                "Fast EMA above slow EMA with RSI confirming upside momentum",
            )
        } else if fast < slow && r < c.put_rsi {
            (
                Direction::Put,
                clamp_confidence(c.base_confidence + (c.put_rsi - r)),
                "Fast EMA below slow EMA with RSI confirming downside momentum",
            )
        } else {
            (Direction::Neutral, 0, "Waiting for a clear signal")
        };

        Ok(StrategySignal {
            direction,
            confidence,
            trend,
            strategy_used: self.name().to_string(),
            indicator_status,
            justification: justification.to_string(),
        })
    }
}
