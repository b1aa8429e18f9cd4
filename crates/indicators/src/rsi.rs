use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return HUNDRED;
    }
    let rs = avg_gain / avg_loss;
    HUNDRED - HUNDRED / (Decimal::ONE + rs)
}

/// Relative Strength Index over the last `period` price changes.
///
/// Average gain and loss are plain means over the window (Cutler's RSI),
/// so the result depends only on the trailing `period + 1` values.
/// A window with no losses reads 100. A completely flat window has no
/// defined RSI and returns `None`, like a too-short series.
pub fn rsi(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }
    let window = &values[values.len() - period - 1..];

    let (gain, loss) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((Decimal::ZERO, Decimal::ZERO), |(g, l), change| {
            if change > Decimal::ZERO {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

    if gain.is_zero() && loss.is_zero() {
        return None;
    }
    let n = Decimal::from(period);
    Some(from_averages(gain / n, loss / n))
}

/// RSI from separate gain and loss histories.
///
/// Every change over the whole series goes to one of two lists: rises to
/// the gains, everything else (flat moves included) to the losses. Each
/// average is taken over the last `period` entries of its own list, so the
/// two averages can span different stretches of the series. No losses
/// reads 100. Returns `None` when the series has fewer than `period + 1`
/// values.
pub fn split_rsi(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }
    let (gains, losses): (Vec<Decimal>, Vec<Decimal>) = values
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .partition(|change| *change > Decimal::ZERO);

    let trailing_mean = |list: &[Decimal]| {
        let tail = &list[list.len().saturating_sub(period)..];
        if tail.is_empty() {
            Decimal::ZERO
        } else {
            tail.iter().map(|d| d.abs()).sum::<Decimal>() / Decimal::from(tail.len())
        }
    };

    Some(from_averages(
        trailing_mean(gains.as_slice()),
        trailing_mean(losses.as_slice()),
    ))
}
