use rust_decimal::Decimal;

/// Simple Moving Average of the last `period` values.
pub fn sma(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let sum: Decimal = window.iter().sum();
    Some(sum / Decimal::from(period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sma_uses_trailing_window() {
        let values = [dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        assert_eq!(sma(&values, 3), Some(dec!(4)));
        assert_eq!(sma(&values, 5), Some(dec!(3)));
    }

    #[test]
    fn test_sma_not_ready() {
        assert_eq!(sma(&[dec!(1), dec!(2)], 3), None);
        assert_eq!(sma(&[dec!(1)], 0), None);
    }
}
