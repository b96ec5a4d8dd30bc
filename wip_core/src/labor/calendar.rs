//! # Calendar Helpers
//!
//! Month arithmetic for capacity projection. Working days are Monday through
//! Friday; there is no holiday calendar.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A calendar month.
///
/// Ordering is chronological (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth::new(date.year(), date.month())
    }

    /// Integer encoding `year * 100 + month`, which sorts chronologically
    pub fn encode(self) -> i64 {
        self.year as i64 * 100 + self.month as i64
    }

    /// The following month, or `None` past the last representable year
    pub fn next(self) -> Option<Self> {
        if self.month >= 12 {
            self.year.checked_add(1).map(|year| YearMonth::new(year, 1))
        } else {
            Some(YearMonth::new(self.year, self.month + 1))
        }
    }

    /// Whether `date` falls inside this month
    pub fn contains(self, date: NaiveDate) -> bool {
        YearMonth::from_date(date) == self
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn working_days(self) -> u32 {
        get_working_days_in_month(self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => write!(f, "{}", first.format("%b %Y")),
            None => write!(f, "{}-{:02}", self.year, self.month),
        }
    }
}

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Number of calendar days in a month. Returns 0 for a month chrono cannot
/// represent.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(0)
}

/// Count of Monday-Friday days in a month.
pub fn get_working_days_in_month(year: i32, month: u32) -> u32 {
    (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

/// `count` consecutive months starting at `start`, in calendar order.
pub fn months_from(start: YearMonth, count: usize) -> impl Iterator<Item = YearMonth> {
    std::iter::successors(Some(start), |ym| ym.next()).take(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_working_days() {
        // June 2024 starts on a Saturday: 20 weekdays
        assert_eq!(get_working_days_in_month(2024, 6), 20);
        // January 2024 starts on a Monday: 23 weekdays
        assert_eq!(get_working_days_in_month(2024, 1), 23);
        // February 2021 is exactly four weeks
        assert_eq!(get_working_days_in_month(2021, 2), 20);
    }

    #[test]
    fn test_year_month_ordering_and_encoding() {
        let dec = YearMonth::new(2024, 12);
        let jan = dec.next().unwrap();
        assert_eq!(jan, YearMonth::new(2025, 1));
        assert!(jan > dec);
        assert_eq!(dec.encode(), 202412);
        assert!(jan.encode() > dec.encode());
    }

    #[test]
    fn test_months_from_wraps_year() {
        let months: Vec<_> = months_from(YearMonth::new(2024, 11), 4).collect();
        assert_eq!(
            months,
            vec![
                YearMonth::new(2024, 11),
                YearMonth::new(2024, 12),
                YearMonth::new(2025, 1),
                YearMonth::new(2025, 2),
            ]
        );
        assert_eq!(months_from(YearMonth::new(2024, 1), 0).count(), 0);
    }

    #[test]
    fn test_last_representable_year_stops() {
        let last = YearMonth::new(i32::MAX, 12);
        assert_eq!(last.next(), None);
        assert_eq!(YearMonth::new(i32::MAX, 11).next(), Some(last));
        assert_eq!(months_from(YearMonth::new(i32::MAX, 11), 5).count(), 2);
        assert_eq!(days_in_month(i32::MAX, 12), 0);
        assert_eq!(get_working_days_in_month(i32::MAX, 12), 0);
    }

    #[test]
    fn test_display_and_contains() {
        let ym = YearMonth::new(2025, 3);
        assert_eq!(ym.to_string(), "Mar 2025");
        assert!(ym.contains(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
        assert!(!ym.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
    }
}
