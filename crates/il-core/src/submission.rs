//! The one-submission-per-day gate.

use chrono::NaiveDate;
use thiserror::Error;

use crate::record::ActivityRecord;
use crate::types::InternId;

/// Upper bound on hours for a single day.
pub const MAX_DAILY_HOURS: f64 = 24.0;

/// Reasons a new record is refused.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubmissionError {
    /// A record already exists for this intern and day.
    #[error("activity for {intern_id} on {date} was already submitted")]
    AlreadySubmitted { intern_id: InternId, date: NaiveDate },

    /// Hours outside (0, 24].
    #[error("hours must be greater than 0 and at most 24, got {hours}")]
    InvalidHours { hours: f64 },

    /// The description was blank.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// The record is dated after the submission day.
    #[error("cannot log activity for {date}, which is after today ({today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
}

/// Checks whether `candidate` may be added alongside `existing` on `today`.
///
/// Future-dated records are refused because the streak is anchored on the
/// newest active day.
pub fn check_submission(
    existing: &[ActivityRecord],
    candidate: &ActivityRecord,
    today: NaiveDate,
) -> Result<(), SubmissionError> {
    if candidate.date > today {
        return Err(SubmissionError::FutureDate {
            date: candidate.date,
            today,
        });
    }
    if !(candidate.hours > 0.0 && candidate.hours <= MAX_DAILY_HOURS) {
        return Err(SubmissionError::InvalidHours {
            hours: candidate.hours,
        });
    }
    if candidate.description.trim().is_empty() {
        return Err(SubmissionError::EmptyDescription);
    }
    if existing
        .iter()
        .any(|r| r.intern_id == candidate.intern_id && r.date == candidate.date)
    {
        return Err(SubmissionError::AlreadySubmitted {
            intern_id: candidate.intern_id.clone(),
            date: candidate.date,
        });
    }
    Ok(())
}
