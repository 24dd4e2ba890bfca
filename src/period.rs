use std::{fmt, str::FromStr};

use chrono::{Datelike as _, Months, NaiveDate};
use thiserror::Error;

use crate::utils;

/// A calendar month one payroll run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayPeriod {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a valid pay period, expected YYYY-MM")]
pub struct PeriodParseError(pub String);

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)?;
        let to = from.checked_add_months(Months::new(1))?.pred_opt()?;

        Some(Self { from, to })
    }

    /// The month that ended before the one `today` falls in
    pub fn preceding(today: NaiveDate) -> Option<Self> {
        let previous = today.checked_sub_months(Months::new(1))?;

        Self::new(previous.year(), previous.month())
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to
    }

    pub fn total_days(&self) -> i64 {
        utils::inclusive_days(self.from, self.to)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.from.year(), self.from.month())
    }
}

impl FromStr for PayPeriod {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError(s.to_string());

        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;

        Self::new(year, month).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        let period = PayPeriod::new(2024, 2).unwrap();

        assert_eq!(period.from_date(), date(2024, 2, 1));
        assert_eq!(period.to_date(), date(2024, 2, 29));
        assert_eq!(period.total_days(), 29);

        let period = PayPeriod::new(2023, 12).unwrap();
        assert_eq!(period.to_date(), date(2023, 12, 31));
        assert_eq!(period.total_days(), 31);
    }

    #[test]
    fn test_preceding() {
        assert_eq!(PayPeriod::preceding(date(2024, 3, 15)), PayPeriod::new(2024, 2));
        assert_eq!(PayPeriod::preceding(date(2024, 1, 1)), PayPeriod::new(2023, 12));
        assert_eq!(PayPeriod::preceding(date(2024, 3, 31)), PayPeriod::new(2024, 2));
    }

    #[test]
    fn test_parse_and_display() {
        let period: PayPeriod = "2024-01".parse().unwrap();
        assert_eq!(period, PayPeriod::new(2024, 1).unwrap());
        assert_eq!(period.to_string(), "2024-01");

        assert!("2024-13".parse::<PayPeriod>().is_err());
        assert!("2024".parse::<PayPeriod>().is_err());
        assert!("january".parse::<PayPeriod>().is_err());
    }
}
