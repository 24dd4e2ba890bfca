use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a currency figure to cents, half away from zero
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of calendar days in `[start, end]`, both ends included
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Clip `[start, end]` to `[window_start, window_end]`
///
/// Returns `None` when nothing of the range is left inside the window
pub fn clip_to_window(
    start: NaiveDate,
    end: NaiveDate,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = start.max(window_start);
    let end = end.min(window_end);

    (end >= start).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(dec!(1935.483870967)), dec!(1935.48));
        assert_eq!(round_currency(dec!(0.125)), dec!(0.13));
        assert_eq!(round_currency(dec!(0.135)), dec!(0.14));
        assert_eq!(round_currency(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn test_inclusive_days() {
        assert_eq!(inclusive_days(date(2024, 6, 1), date(2024, 6, 30)), 30);
        assert_eq!(inclusive_days(date(2024, 6, 3), date(2024, 6, 3)), 1);
        assert_eq!(inclusive_days(date(2024, 2, 28), date(2024, 3, 1)), 3);
    }

    #[test]
    fn test_clip_to_window() {
        let (start, end) = (date(2024, 3, 1), date(2024, 3, 31));

        assert_eq!(
            clip_to_window(date(2024, 2, 27), date(2024, 3, 2), start, end),
            Some((date(2024, 3, 1), date(2024, 3, 2)))
        );
        assert_eq!(
            clip_to_window(date(2024, 3, 30), date(2024, 4, 4), start, end),
            Some((date(2024, 3, 30), date(2024, 3, 31)))
        );
        assert_eq!(clip_to_window(date(2024, 2, 1), date(2024, 2, 5), start, end), None);
    }
}
