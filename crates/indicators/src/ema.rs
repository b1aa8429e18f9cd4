use rust_decimal::Decimal;

/// Exponential Moving Average at the last value.
///
/// Seeded with the SMA of the first `period` values, then smoothed with
/// `2 / (period + 1)` over the remainder of the series.
pub fn ema(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let multiplier = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);
    let seed: Decimal = values[..period].iter().sum::<Decimal>() / Decimal::from(period);

    Some(
        values[period..]
            .iter()
            .fold(seed, |prev, value| (*value - prev) * multiplier + prev),
    )
}

/// EMA over the trailing `period` values, seeded with the first of them.
///
/// Shorter series are smoothed in full. Unlike [`ema`] this never needs a
/// warm-up window, so it is defined for any non-empty input.
pub fn trailing_ema(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 {
        return None;
    }
    let window = &values[values.len().saturating_sub(period)..];
    let (first, rest) = window.split_first()?;
    let multiplier = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);

    Some(
        rest.iter()
            .fold(*first, |prev, value| (*value - prev) * multiplier + prev),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ema_seed_only() {
        // (2+4+6)/3 = 4
        assert_eq!(ema(&[dec!(2), dec!(4), dec!(6)], 3), Some(dec!(4)));
    }

    #[test]
    fn test_ema_after_seed() {
        // seed 4, then (8 - 4) * 0.5 + 4 = 6
        assert_eq!(ema(&[dec!(2), dec!(4), dec!(6), dec!(8)], 3), Some(dec!(6)));
    }

    #[test]
    fn test_ema_not_ready() {
        assert_eq!(ema(&[dec!(2), dec!(4)], 3), None);
    }

    #[test]
    fn test_trailing_ema_uses_last_window() {
        // window [4, 6, 8] seeded at 4: 4 -> 5 -> 6.5
        let values = [dec!(100), dec!(4), dec!(6), dec!(8)];
        assert_eq!(trailing_ema(&values, 3), Some(dec!(6.5)));
    }

    #[test]
    fn test_trailing_ema_short_series() {
        // fewer values than the period: seeded at 10, k = 0.5
        assert_eq!(trailing_ema(&[dec!(10), dec!(20)], 3), Some(dec!(15)));
        assert_eq!(trailing_ema(&[], 3), None);
    }
}
