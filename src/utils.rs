use crate::error::{ExpenseAnalysisError, Result};
use crate::schema::Period;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// English month name for a 1-based month.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = month.checked_sub(1)? as usize;
    MONTH_NAMES.get(idx).copied()
}

/// Parses the date forms spreadsheet exports commonly produce.
/// Time-of-day components are dropped.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parses a period string in the format "YYYY-MM".
pub fn parse_period_string(period: &str) -> Result<Period> {
    let trimmed = period.trim();
    let start_str = format!("{}-01", trimmed);
    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d")
        .map_err(|_| ExpenseAnalysisError::InvalidPeriod(period.to_string()))?;
    Ok(Period::from_date(start_date))
}
