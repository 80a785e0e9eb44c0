//! Calendar-month arithmetic shared by billing cycles, installments, and recurrences.

use chrono::{Datelike, Duration, NaiveDate};

/// Shifts a date by whole calendar months, clamping the day to the target
/// month's length (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).expect("clamped day is always valid")
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).expect("day 28 exists"));
    (first_next - Duration::days(1)).day()
}

/// Resolves a day-of-month anchor within a month, clamping anchors past the
/// month's end to its last day (anchor 31 in February resolves to Feb 28/29).
pub fn clamped_dom(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day.max(1)).expect("clamped day is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_months_preserves_day_when_possible() {
        assert_eq!(add_months(date(2024, 1, 15), 1), date(2024, 2, 15));
        assert_eq!(add_months(date(2024, 11, 5), 3), date(2025, 2, 5));
    }

    #[test]
    fn add_months_clamps_to_short_months() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 3, 31), 1), date(2024, 4, 30));
    }

    #[test]
    fn add_months_handles_negative_steps() {
        assert_eq!(add_months(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 1, 10), -2), date(2023, 11, 10));
    }

    #[test]
    fn days_in_month_covers_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn clamped_dom_resolves_oversized_anchors() {
        assert_eq!(clamped_dom(2024, 2, 31), date(2024, 2, 29));
        assert_eq!(clamped_dom(2023, 2, 30), date(2023, 2, 28));
        assert_eq!(clamped_dom(2024, 7, 31), date(2024, 7, 31));
    }
}
