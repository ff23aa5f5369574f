//! Calendar date helpers.
//!
//! Every date the scheduler stores or exchanges is a plain calendar date in
//! `YYYYMMDD` form. The fixed width means lexical order equals chronological
//! order, which the storage layer relies on for `ORDER BY date`.

use chrono::{Datelike, Days, Local, NaiveDate};

use super::error::DateFormatError;

/// `chrono` format string for the wire/storage representation.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Last year that fits the four-digit `YYYY` field.
pub const LAST_YEAR: i32 = 9999;

/// Parse a strict 8-digit `YYYYMMDD` string.
///
/// Anything else (separators, signs, short years, out-of-range month/day
/// combinations such as `20240192`) is rejected.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateFormatError> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateFormatError::new(s));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| DateFormatError::new(s))
}

/// Whether `date` has an 8-digit `YYYYMMDD` form.
pub fn is_representable(date: NaiveDate) -> bool {
    (0..=LAST_YEAR).contains(&date.year())
}

/// Format a date as `YYYYMMDD`.
///
/// Only meaningful for dates that pass [`is_representable`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Add `n` calendar days, saturating at the last representable date.
pub fn add_days(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(n)))
        .unwrap_or(NaiveDate::MAX)
}

/// Add `n` calendar years.
///
/// A Feb 29 that lands in a non-leap year rolls over to Mar 1, matching how
/// calendar normalisation treats the missing day.
pub fn add_years(date: NaiveDate, n: u32) -> NaiveDate {
    let Ok(n) = i32::try_from(n) else {
        return NaiveDate::MAX;
    };
    let Some(year) = date.year().checked_add(n) else {
        return NaiveDate::MAX;
    };
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(NaiveDate::MAX)
}

/// The current local calendar date.
///
/// Only the transport layer calls this; core functions take the date as an
/// argument.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_accepts_compact_dates() {
        assert_eq!(parse_date("20240129").unwrap(), ymd(2024, 1, 29));
        assert_eq!(parse_date("16890220").unwrap(), ymd(1689, 2, 20));
    }

    #[test]
    fn parse_rejects_other_formats() {
        for input in ["", "2024012", "202401290", "28.01.2024", "2024-01-29", "+2024012", "abcdefgh"] {
            assert!(parse_date(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn parse_rejects_calendar_invalid_dates() {
        assert!(parse_date("20240192").is_err());
        assert!(parse_date("20241301").is_err());
        assert!(parse_date("20230229").is_err());
        assert!(parse_date("20240229").is_ok());
    }

    #[test]
    fn format_is_zero_padded() {
        assert_eq!(format_date(ymd(2024, 2, 1)), "20240201");
        assert_eq!(format_date(ymd(987, 3, 4)), "09870304");
    }

    #[test]
    fn add_days_crosses_month_and_leap_day() {
        assert_eq!(add_days(ymd(2024, 2, 28), 1), ymd(2024, 2, 29));
        assert_eq!(add_days(ymd(2023, 2, 28), 1), ymd(2023, 3, 1));
        assert_eq!(add_days(ymd(2024, 12, 31), 1), ymd(2025, 1, 1));
    }

    #[test]
    fn add_years_rolls_leap_day_forward() {
        assert_eq!(add_years(ymd(2024, 2, 29), 1), ymd(2025, 3, 1));
        assert_eq!(add_years(ymd(2024, 2, 29), 4), ymd(2028, 2, 29));
        assert_eq!(add_years(ymd(2023, 12, 31), 1), ymd(2024, 12, 31));
    }

    #[test]
    fn representable_range_ends_in_year_9999() {
        assert!(is_representable(ymd(9999, 12, 31)));
        assert!(is_representable(ymd(1, 1, 1)));
        assert!(!is_representable(add_days(ymd(9999, 12, 31), 1)));
        assert!(!is_representable(add_years(ymd(9999, 6, 1), 1)));
        assert!(!is_representable(NaiveDate::MAX));
    }

    #[test]
    fn arithmetic_saturates_instead_of_panicking() {
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_years(NaiveDate::MAX, 1), NaiveDate::MAX);
    }
}
