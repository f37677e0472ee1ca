//! Eligibility command for checking certification status.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use il_core::{EligibilityPolicy, EligibilityResult, InternId, calculate_eligibility};
use il_db::Database;
use serde::Serialize;

use crate::Config;
use crate::commands::util::{format_hours, plural_days, write_json};

#[derive(Debug, Args)]
pub struct EligibilityArgs {
    /// Intern ID (case-insensitive).
    #[arg(long)]
    pub intern: InternId,

    /// Joining date (YYYY-MM-DD). Only affects gaps when the policy's
    /// `gap_origin` is `joining_date`. Defaults to `joining_dates` in config.
    #[arg(long)]
    pub joined: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct EligibilityOutput<'a> {
    intern_id: &'a InternId,
    #[serde(flatten)]
    result: &'a EligibilityResult,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &EligibilityArgs,
    config: &Config,
) -> Result<()> {
    let policy = &config.policy;
    let records = db.list_records(&args.intern)?;
    let joined = args.joined.or_else(|| config.joining_date(&args.intern));
    let result = calculate_eligibility(&records, joined, policy);

    if args.json {
        return write_json(
            writer,
            &EligibilityOutput {
                intern_id: &args.intern,
                result: &result,
            },
        );
    }
    write!(writer, "{}", format_eligibility(&args.intern, &result, policy))?;
    Ok(())
}

/// Formats an eligibility result for terminal output.
pub fn format_eligibility(
    intern: &InternId,
    result: &EligibilityResult,
    policy: &EligibilityPolicy,
) -> String {
    let verdict = if result.is_eligible {
        "ELIGIBLE"
    } else {
        "NOT ELIGIBLE"
    };

    let mut output = String::new();
    writeln!(output, "ELIGIBILITY: {intern} - {verdict}").unwrap();
    writeln!(
        output,
        "Active days:   {} (min {})",
        result.active_days, policy.min_active_days
    )
    .unwrap();
    writeln!(
        output,
        "Average hours: {} (min {})",
        format_hours(result.average_hours),
        policy.min_average_hours
    )
    .unwrap();
    writeln!(
        output,
        "Longest gap:   {} (max {})",
        plural_days(result.max_gap_days),
        policy.max_gap_days
    )
    .unwrap();

    if !result.reasons.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "UNMET CRITERIA").unwrap();
        writeln!(output, "──────────────").unwrap();
        for reason in &result.reasons {
            writeln!(output, "- {reason}").unwrap();
        }
    }
    output
}
