//! Pure helper collaborators used by repository callers.
//!
//! # Responsibility
//! - Validate `YYYY-MM-DD` date strings before building meal plans.
//! - Derive total calories from quantity and per-unit calories.
//!
//! # Invariants
//! - These functions hold no state and touch no storage.
//! - The repository does not call them; enforcement is the caller's job.

use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date regex"));

/// Returns whether `value` is an exact `YYYY-MM-DD` calendar date.
///
/// Shape alone is not enough: month and day ranges are checked, including
/// leap-year February.
pub fn is_valid_date(value: &str) -> bool {
    let Some(captures) = DATE_RE.captures(value) else {
        return false;
    };

    // The regex guarantees the groups are all-digit, so parsing cannot fail.
    let year: i64 = captures[1].parse().unwrap_or(0);
    let month: u32 = captures[2].parse().unwrap_or(0);
    let day: u32 = captures[3].parse().unwrap_or(0);

    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }

    day <= days_in_month(year, month)
}

/// Total calories for a quantity of food with a per-unit calorie count.
pub fn total_calories(quantity: f64, calories_per_unit: i64) -> f64 {
    quantity * calories_per_unit as f64
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::{is_valid_date, total_calories};

    #[test]
    fn accepts_plain_calendar_dates() {
        assert!(is_valid_date("2023-06-15"));
        assert!(is_valid_date("1999-12-31"));
    }

    #[test]
    fn accepts_leap_day_only_in_leap_years() {
        assert!(is_valid_date("2024-02-29"));
        assert!(is_valid_date("2000-02-29"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date("1900-02-29"));
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(!is_valid_date("2023-13-01"));
        assert!(!is_valid_date("2023-00-10"));
        assert!(!is_valid_date("2023-04-31"));
        assert!(!is_valid_date("2023-02-30"));
        assert!(!is_valid_date("2023-06-00"));
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert!(!is_valid_date("2023/06/15"));
        assert!(!is_valid_date("23-06-15"));
        assert!(!is_valid_date("2023-6-15"));
        assert!(!is_valid_date("2023-06-15 "));
        assert!(!is_valid_date(""));
    }

    #[test]
    fn total_calories_is_the_product() {
        assert_eq!(total_calories(2.0, 52), 104.0);
        assert_eq!(total_calories(0.5, 165), 82.5);
        assert_eq!(total_calories(0.0, 999), 0.0);
    }
}
