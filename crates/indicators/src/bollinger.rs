use crate::sma::sma;
use rust_decimal::Decimal;

/// Bollinger Bands at the last value of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

/// Middle band is the SMA of the last `period` values; the outer bands sit
/// `num_std` sample standard deviations away from it.
pub fn bollinger(values: &[Decimal], period: usize, num_std: Decimal) -> Option<Bands> {
    let middle = sma(values, period)?;
    let sd = std_dev(&values[values.len() - period..])?;
    Some(Bands {
        upper: middle + num_std * sd,
        middle,
        lower: middle - num_std * sd,
    })
}

/// Sample standard deviation (n - 1 denominator). `None` for fewer than two values.
pub fn std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let n = Decimal::from(values.len());
    let mean = values.iter().sum::<Decimal>() / n;
    let squares: Decimal = values
        .iter()
        .map(|v| {
            let diff = *v - mean;
            diff * diff
        })
        .sum();
    Some(decimal_sqrt(squares / (n - Decimal::ONE)))
}

/// Newton's method square root for Decimal. Non-positive input yields zero.
pub fn decimal_sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let epsilon = Decimal::new(1, 12);
    let mut guess = if value > Decimal::ONE { value / Decimal::TWO } else { Decimal::ONE };
    for _ in 0..100 {
        let next = (guess + value / guess) / Decimal::TWO;
        let converged = (next - guess).abs() < epsilon;
        guess = next;
        if converged {
            break;
        }
    }
    guess
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bands_straddle_middle() {
        let values = [dec!(10), dec!(11), dec!(12)];
        let bands = bollinger(&values, 3, Decimal::TWO).unwrap();
        assert_eq!(bands.middle, dec!(11));
        // sample std of 10,11,12 is exactly 1
        assert!((bands.upper - dec!(13)).abs() < dec!(0.000001));
        assert!((bands.lower - dec!(9)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_flat_series_collapses_bands() {
        let values = vec![dec!(5); 20];
        let bands = bollinger(&values, 20, Decimal::TWO).unwrap();
        assert_eq!(bands.upper, bands.lower);
    }

    #[test]
    fn test_decimal_sqrt() {
        assert!((decimal_sqrt(dec!(4)) - dec!(2)).abs() < dec!(0.0001));
        assert!((decimal_sqrt(dec!(9)) - dec!(3)).abs() < dec!(0.0001));
        assert!((decimal_sqrt(dec!(0.0004)) - dec!(0.02)).abs() < dec!(0.0001));
        assert_eq!(decimal_sqrt(dec!(-1)), Decimal::ZERO);
    }
}
