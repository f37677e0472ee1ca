//! Certificate eligibility.
//!
//! Compares accumulated activity against an [`EligibilityPolicy`] and explains
//! every unmet criterion.
//!
//! # Gap Semantics
//!
//! The gap between two chronologically adjacent records is the number of
//! calendar days strictly between them, so back-to-back days have a gap of 0.
//! Adjacent records sharing a date yield -1, which never raises the maximum
//! because the maximum starts at 0.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::ActivityRecord;
use crate::stats::{active_dates, average_hours, total_hours};

/// Where gap counting starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapOrigin {
    /// Gaps are measured between logged activities only. The joining date
    /// has no effect.
    #[default]
    FirstActivity,
    /// Also counts the days between the joining date and the first activity.
    JoiningDate,
}

/// Program thresholds for certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    /// Minimum number of distinct active days.
    pub min_active_days: usize,

    /// Minimum average hours per active day.
    pub min_average_hours: f64,

    /// Longest run of missed days that is still acceptable.
    pub max_gap_days: u32,

    /// Where gap counting starts.
    pub gap_origin: GapOrigin,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            min_active_days: 60,
            min_average_hours: 2.5,
            max_gap_days: 3,
            gap_origin: GapOrigin::FirstActivity,
        }
    }
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub active_days: usize,
    pub average_hours: f64,
    pub max_gap_days: i64,
    /// One entry per unmet criterion: active days, average hours, gap.
    pub reasons: Vec<String>,
}

/// Evaluates `records` against `policy`.
///
/// `joining_date` only matters when the policy's [`GapOrigin`] is
/// [`GapOrigin::JoiningDate`]. An intern with no records is never eligible.
pub fn calculate_eligibility(
    records: &[ActivityRecord],
    joining_date: Option<NaiveDate>,
    policy: &EligibilityPolicy,
) -> EligibilityResult {
    let mut sorted: Vec<&ActivityRecord> = records.iter().collect();
    // Stable: records sharing a date keep their input order
    sorted.sort_by_key(|r| r.date);

    let active_days = active_dates(records).len();
    let average_hours = average_hours(total_hours(records), active_days);

    let mut max_gap_days = sorted
        .windows(2)
        .map(|pair| (pair[1].date - pair[0].date).num_days() - 1)
        .fold(0, i64::max);

    if policy.gap_origin == GapOrigin::JoiningDate {
        if let (Some(joined), Some(first)) = (joining_date, sorted.first()) {
            max_gap_days = max_gap_days.max((first.date - joined).num_days());
        }
    }

    let mut reasons = Vec::new();
    if active_days < policy.min_active_days {
        reasons.push(format!(
            "Needs at least {} active days (currently {active_days})",
            policy.min_active_days
        ));
    }
    if average_hours < policy.min_average_hours {
        reasons.push(format!(
            "Average of {average_hours:.1} hours/day is below the required {}",
            policy.min_average_hours
        ));
    }
    if max_gap_days > i64::from(policy.max_gap_days) {
        reasons.push(format!(
            "Longest gap of {} exceeds the allowed {}",
            days(max_gap_days),
            days(i64::from(policy.max_gap_days))
        ));
    }

    tracing::trace!(
        active_days,
        average_hours,
        max_gap_days,
        unmet = reasons.len(),
        "evaluated eligibility"
    );

    EligibilityResult {
        is_eligible: reasons.is_empty() && active_days > 0,
        active_days,
        average_hours,
        max_gap_days,
        reasons,
    }
}

fn days(count: i64) -> String {
    if count == 1 {
        "1 day".to_string()
    } else {
        format!("{count} days")
    }
}
