//! Date windows: the inclusive calendar-date ranges used to query and summarize transactions.
//!
//! Everything here is pure. Dates are `NaiveDate` values, so boundaries never shift with the
//! caller's timezone.

use crate::error::{Error, ErrorType, Result};
use crate::model::{Transaction, UserId, DATE_FORMAT};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A (user, start date, end date) triple identifying a range of transactions. Both ends are
/// inclusive and `start <= end` always holds. This is also the key of the ledger cache.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryWindow {
    user_id: UserId,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl QueryWindow {
    /// # Errors
    /// Returns an `ErrorType::Validation` error if `start_date` is after `end_date`.
    pub fn new(user_id: UserId, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date > end_date {
            return Err(Error::msg(
                ErrorType::Validation,
                format!("The window start {start_date} is after its end {end_date}"),
            ));
        }
        Ok(Self {
            user_id,
            start_date,
            end_date,
        })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// True if `date` falls within the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// True if `transaction` belongs to this window's user and falls within its dates.
    pub fn admits(&self, transaction: &Transaction) -> bool {
        transaction.user_id() == &self.user_id && self.contains(transaction.date())
    }
}

impl Display for QueryWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}..{}",
            self.user_id,
            self.start_date.format(DATE_FORMAT),
            self.end_date.format(DATE_FORMAT)
        )
    }
}

/// A period the user can select: one calendar month or one calendar year.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Period {
    Month { month: u32, year: i32 },
    Year { year: i32 },
}

impl Period {
    /// # Errors
    /// Returns an `ErrorType::Validation` error if `month` is not within `1..=12`.
    pub fn month(month: u32, year: i32) -> Result<Self> {
        validate_month(month)?;
        Ok(Period::Month { month, year })
    }

    pub fn year(year: i32) -> Self {
        Period::Year { year }
    }

    /// The first and last calendar day of this period.
    ///
    /// # Errors
    /// Returns an `ErrorType::Validation` error if the month or year is out of range.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
        match *self {
            Period::Month { month, year } => {
                validate_month(month)?;
                let start = ymd(year, month, 1)?;
                // The day before the first of the following month
                let (next_year, next_month) = if month == 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                let end = ymd(next_year, next_month, 1)?
                    .pred_opt()
                    .ok_or_else(|| out_of_range(year, month))?;
                Ok((start, end))
            }
            Period::Year { year } => Ok((ymd(year, 1, 1)?, ymd(year, 12, 31)?)),
        }
    }

    /// The query window covering this period for `user_id`.
    pub fn window(&self, user_id: &UserId) -> Result<QueryWindow> {
        let (start, end) = self.bounds()?;
        QueryWindow::new(user_id.clone(), start, end)
    }

    /// True if `date` falls within this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Period::Month { month, year } => date.month() == month && date.year() == year,
            Period::Year { year } => date.year() == year,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Period::Month { month, year } => match NaiveDate::from_ymd_opt(year, month, 1) {
                Some(first) => write!(f, "{}", first.format("%B %Y")),
                None => write!(f, "{year}-{month:02}"),
            },
            Period::Year { year } => write!(f, "{year}"),
        }
    }
}

/// The window from the first through the last calendar day of `month` (1 to 12) in `year`.
///
/// # Errors
/// Returns an `ErrorType::Validation` error if the month or year is out of range.
pub fn month_window(user_id: &UserId, month: u32, year: i32) -> Result<QueryWindow> {
    Period::Month { month, year }.window(user_id)
}

/// The window from January 1 through December 31 of `year`.
///
/// # Errors
/// Returns an `ErrorType::Validation` error if the year is out of range.
pub fn year_window(user_id: &UserId, year: i32) -> Result<QueryWindow> {
    Period::year(year).window(user_id)
}

fn validate_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::msg(
            ErrorType::Validation,
            format!("Month must be between 1 and 12, got {month}"),
        ))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| out_of_range(year, month))
}

fn out_of_range(year: i32, month: u32) -> Error {
    Error::msg(
        ErrorType::Validation,
        format!("The date {year}-{month:02} is out of range"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1")
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_window_leap_february() {
        let w = month_window(&user(), 2, 2024).unwrap();
        assert_eq!(w.start_date(), d(2024, 2, 1));
        assert_eq!(w.end_date(), d(2024, 2, 29));
    }

    #[test]
    fn test_month_window_common_february() {
        let w = month_window(&user(), 2, 2023).unwrap();
        assert_eq!(w.end_date(), d(2023, 2, 28));
    }

    #[test]
    fn test_month_window_century_rules() {
        assert_eq!(month_window(&user(), 2, 1900).unwrap().end_date(), d(1900, 2, 28));
        assert_eq!(month_window(&user(), 2, 2000).unwrap().end_date(), d(2000, 2, 29));
    }

    #[test]
    fn test_month_window_all_lengths() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (ix, days) in expected.iter().enumerate() {
            let month = ix as u32 + 1;
            let w = month_window(&user(), month, 2023).unwrap();
            assert_eq!(w.start_date(), d(2023, month, 1));
            assert_eq!(w.end_date(), d(2023, month, *days), "month {month}");
        }
    }

    #[test]
    fn test_month_window_december_rolls_year() {
        let w = month_window(&user(), 12, 2024).unwrap();
        assert_eq!(w.end_date(), d(2024, 12, 31));
    }

    #[test]
    fn test_month_window_rejects_bad_month() {
        for month in [0, 13] {
            let err = month_window(&user(), month, 2024).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
        }
    }

    #[test]
    fn test_year_window() {
        let w = year_window(&user(), 2024).unwrap();
        assert_eq!(w.start_date(), d(2024, 1, 1));
        assert_eq!(w.end_date(), d(2024, 12, 31));
        assert_eq!(w.end_date().ordinal(), 366);
        assert_eq!(year_window(&user(), 2023).unwrap().end_date().ordinal(), 365);
    }

    #[test]
    fn test_windows_are_deterministic_keys() {
        let a = month_window(&user(), 6, 2024).unwrap();
        let b = Period::month(6, 2024).unwrap().window(&user()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, month_window(&UserId::new("u2"), 6, 2024).unwrap());
        assert_eq!(a.to_string(), "u1:2024-06-01..2024-06-30");
    }

    #[test]
    fn test_contains_is_inclusive() {
        let w = month_window(&user(), 6, 2024).unwrap();
        assert!(w.contains(d(2024, 6, 1)));
        assert!(w.contains(d(2024, 6, 30)));
        assert!(!w.contains(d(2024, 5, 31)));
        assert!(!w.contains(d(2024, 7, 1)));
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let err = QueryWindow::new(user(), d(2024, 2, 1), d(2024, 1, 1)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(QueryWindow::new(user(), d(2024, 1, 1), d(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_period_contains() {
        let june = Period::month(6, 2024).unwrap();
        assert!(june.contains(d(2024, 6, 15)));
        assert!(!june.contains(d(2023, 6, 15)));
        assert!(Period::year(2024).contains(d(2024, 12, 31)));
        assert!(!Period::year(2024).contains(d(2025, 1, 1)));
    }

    #[test]
    fn test_bounds_out_of_range() {
        let err = Period::year(300_000).bounds().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(Period::Month { month: 1, year: 300_000 }.bounds().is_err());
        assert!(Period::Month { month: 0, year: 2024 }.bounds().is_err());
        assert_eq!(
            Period::month(2, 2024).unwrap().bounds().unwrap(),
            (d(2024, 2, 1), d(2024, 2, 29))
        );
    }

    #[test]
    fn test_period_display() {
        assert_eq!(Period::month(6, 2024).unwrap().to_string(), "June 2024");
        assert_eq!(Period::year(2024).to_string(), "2024");
    }
}
