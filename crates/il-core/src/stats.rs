//! Activity statistics.
//!
//! Computes active-day counts, average hours and the current streak from a
//! slice of records. Everything here is a pure function of its arguments;
//! "today" is passed in rather than read from the clock.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::record::{ActivityRecord, sanitize_hours};

/// Derived activity metrics for one intern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Statistics {
    /// Number of distinct dates with at least one record.
    pub total_active_days: usize,
    /// Total hours divided by active days. Zero when there are no records.
    pub average_hours: f64,
    /// Consecutive active days ending today or yesterday.
    pub current_streak: usize,
    /// Raw record count, including duplicate dates.
    pub total_submissions: usize,
}

/// Distinct dates present in `records`, ascending.
pub(crate) fn active_dates(records: &[ActivityRecord]) -> BTreeSet<NaiveDate> {
    records.iter().map(|r| r.date).collect()
}

/// Sum of hours across every record, duplicates included.
pub(crate) fn total_hours(records: &[ActivityRecord]) -> f64 {
    records.iter().map(|r| sanitize_hours(r.hours)).sum()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "day counts are far below f64 precision limits"
)]
pub(crate) fn average_hours(total_hours: f64, active_days: usize) -> f64 {
    if active_days == 0 {
        0.0
    } else {
        total_hours / active_days as f64
    }
}

/// Computes statistics for `records` relative to the calendar day `today`.
///
/// Records may be empty, unordered, or share dates. Shared dates count once
/// towards active days but every record's hours are summed.
pub fn calculate_stats(records: &[ActivityRecord], today: NaiveDate) -> Statistics {
    let dates = active_dates(records);
    let total_active_days = dates.len();
    let average_hours = average_hours(total_hours(records), total_active_days);

    Statistics {
        total_active_days,
        average_hours,
        current_streak: current_streak(&dates, today),
        total_submissions: records.len(),
    }
}

/// Walks distinct dates backwards from the newest one.
///
/// The streak only counts if the newest date is today or yesterday, and it
/// stops at the first missing day.
fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> usize {
    let mut newest_first = dates.iter().rev();
    let Some(&newest) = newest_first.next() else {
        return 0;
    };
    if newest != today && newest != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    let mut previous = newest;
    for &date in newest_first {
        if previous - date != Duration::days(1) {
            break;
        }
        streak += 1;
        previous = date;
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{consecutive, day, record};

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = calculate_stats(&[], day("2024-03-01"));
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.total_active_days, 0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_submissions, 0);
    }

    #[test]
    fn average_divides_by_distinct_days() {
        let records = vec![
            record("2024-01-01", 3.0),
            record("2024-01-03", 2.0),
            record("2024-01-02", 4.0),
        ];
        let stats = calculate_stats(&records, day("2024-03-01"));
        assert_eq!(stats.total_active_days, 3);
        assert!((stats.average_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn duplicate_dates_count_once_but_hours_sum() {
        let records = vec![record("2024-01-01", 3.0), record("2024-01-01", 2.0)];
        let stats = calculate_stats(&records, day("2024-01-01"));
        assert_eq!(stats.total_active_days, 1);
        assert_eq!(stats.total_submissions, 2);
        assert!((stats.average_hours - 5.0).abs() < 1e-9);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let records = consecutive("2024-03-10", 5, 2.0);
        let stats = calculate_stats(&records, day("2024-03-10"));
        assert_eq!(stats.current_streak, 5);
    }

    #[test]
    fn streak_still_counts_when_newest_is_yesterday() {
        let records = consecutive("2024-03-09", 4, 2.0);
        let stats = calculate_stats(&records, day("2024-03-10"));
        assert_eq!(stats.current_streak, 4);
    }

    #[test]
    fn streak_is_zero_when_newest_is_older_than_yesterday() {
        let records = consecutive("2024-03-08", 4, 2.0);
        let stats = calculate_stats(&records, day("2024-03-10"));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_active_days, 4);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let mut records = consecutive("2024-03-10", 3, 2.0);
        // 03-07 is missing; older days never resume the streak
        records.extend(consecutive("2024-03-06", 10, 2.0));
        let stats = calculate_stats(&records, day("2024-03-10"));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.total_active_days, 13);
    }

    #[test]
    fn streak_ignores_input_order() {
        let mut records = consecutive("2024-03-10", 6, 1.0);
        records.reverse();
        records.swap(1, 4);
        let stats = calculate_stats(&records, day("2024-03-10"));
        assert_eq!(stats.current_streak, 6);
    }

    #[test]
    fn invalid_hours_contribute_zero() {
        let records = vec![record("2024-01-01", f64::NAN), record("2024-01-02", 4.0)];
        let stats = calculate_stats(&records, day("2024-01-02"));
        assert!((stats.average_hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let records = vec![
            record("2024-01-01", 1.1),
            record("2024-01-02", 2.2),
            record("2024-01-02", 3.3),
        ];
        let today = day("2024-01-02");
        let first = calculate_stats(&records, today);
        let second = calculate_stats(&records, today);
        assert_eq!(first.average_hours.to_bits(), second.average_hours.to_bits());
        assert_eq!(first, second);
    }
}
