use rust_decimal::Decimal;

/// Trailing arithmetic mean over `window` values.
///
/// The first `window - 1` entries are `None`; they have no full window behind
/// them and must never take part in a comparison.
pub fn rolling_mean(values: &[Decimal], window: usize) -> Vec<Option<Decimal>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let divisor = Decimal::from(window as u64);
    let mut sum = Decimal::ZERO;

    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            sum += *value;
            if i >= window {
                sum -= values[i - window];
            }

            if i + 1 >= window {
                Some(sum / divisor)
            } else {
                None
            }
        })
        .collect()
}

/// Smoothing factor for an EMA span: `2 / (span + 1)`.
pub fn smoothing_factor(span: usize) -> Decimal {
    Decimal::TWO / Decimal::from(span as u64 + 1)
}

/// Recursive exponential moving average.
///
/// Seeded from the first defined input; undefined inputs before the seed stay
/// undefined. Each step is `ema + α·(x − ema)`, so a constant input leaves the
/// average exactly unchanged.
pub fn ema(values: &[Option<Decimal>], span: usize) -> Vec<Option<Decimal>> {
    let alpha = smoothing_factor(span);

    values
        .iter()
        .scan(None::<Decimal>, |state, value| {
            if let Some(x) = value {
                *state = Some(match *state {
                    Some(prev) => prev + alpha * (*x - prev),
                    None => *x,
                });
            }
            Some(*state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rolling_mean_leading_entries_undefined() {
        let values = vec![dec!(1), dec!(2), dec!(3), dec!(4)];
        let rolled = rolling_mean(&values, 3);

        assert_eq!(rolled, vec![None, None, Some(dec!(2)), Some(dec!(3))]);
    }

    #[test]
    fn test_rolling_mean_window_of_one_is_identity() {
        let values = vec![dec!(5.5), dec!(6.25)];
        assert_eq!(rolling_mean(&values, 1), vec![Some(dec!(5.5)), Some(dec!(6.25))]);
    }

    #[test]
    fn test_smoothing_factor() {
        assert_eq!(smoothing_factor(9), dec!(0.2));
        assert_eq!(smoothing_factor(1), dec!(1));
    }

    #[test]
    fn test_ema_recursion() {
        // span 3 => alpha 0.5
        let values = vec![None, Some(dec!(10)), Some(dec!(20)), Some(dec!(30))];
        let out = ema(&values, 3);

        assert_eq!(out, vec![None, Some(dec!(10)), Some(dec!(15)), Some(dec!(22.5))]);
    }

    #[test]
    fn test_ema_constant_input_is_exact() {
        let values = vec![Some(dec!(31234.57)); 50];
        let short = ema(&values, 9);
        let long = ema(&values, 21);

        assert_eq!(short.last(), Some(&Some(dec!(31234.57))));
        assert_eq!(short.last(), long.last());
    }
}
