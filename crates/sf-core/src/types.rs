//! Common types used throughout Shopfloor RS

use chrono::{NaiveDate, Utc};

/// Primary key type. Entities carry string identifiers on the wire
/// (`p-…`, `wp-…`, `dr-…`, `user_…`).
pub type Id = String;

/// Current date in the store's schedule format (no time component).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Inclusive day count between two dates, never less than one.
///
/// A process started and finished on the same day counts as one day of work.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_inclusive_days_same_day() {
        assert_eq!(inclusive_days(date("2024-01-01"), date("2024-01-01")), 1);
    }

    #[test]
    fn test_inclusive_days_range() {
        assert_eq!(inclusive_days(date("2024-01-01"), date("2024-01-03")), 3);
    }

    #[test]
    fn test_inclusive_days_never_below_one() {
        // End before start collapses to the minimum of one day.
        assert_eq!(inclusive_days(date("2024-01-05"), date("2024-01-01")), 1);
    }
}
