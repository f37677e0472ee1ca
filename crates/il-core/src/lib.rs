//! Core domain logic for the intern activity log.
//!
//! This crate contains the fundamental types and logic for:
//! - Statistics: active days, average hours and the current streak
//! - Eligibility: comparing activity against certification thresholds
//! - Merging: combining cached and remote records one-per-day
//! - Submission: the one-record-per-day gate

mod eligibility;
mod merge;
pub mod record;
mod stats;
mod submission;
pub mod types;

#[cfg(test)]
mod test_support;

pub use eligibility::{EligibilityPolicy, EligibilityResult, GapOrigin, calculate_eligibility};
pub use merge::merge_records;
pub use record::{ActivityRecord, ProofKind};
pub use stats::{Statistics, calculate_stats};
pub use submission::{MAX_DAILY_HOURS, SubmissionError, check_submission};
pub use types::{Category, InternId, QualityScore, ValidationError};
