//! Review command: the admin overview across all interns.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use il_core::{
    ActivityRecord, EligibilityResult, InternId, Statistics, calculate_eligibility,
    calculate_stats,
};
use il_db::Database;
use rayon::prelude::*;
use serde::Serialize;

use crate::Config;
use crate::commands::util::{format_hours, resolve_today, write_json};

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Compute streaks as of this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One intern's row in the review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternSummary {
    pub intern_id: InternId,
    pub stats: Statistics,
    pub eligibility: EligibilityResult,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &ReviewArgs,
    config: &Config,
) -> Result<()> {
    let records = db.list_all()?;
    let as_of = resolve_today(args.today);
    let summaries = summarize(&records, as_of, config);
    tracing::debug!(interns = summaries.len(), "built review");

    if args.json {
        return write_json(writer, &summaries);
    }
    write!(writer, "{}", format_review(as_of, &summaries))?;
    Ok(())
}

/// Computes stats and eligibility per intern, in parallel, ordered by intern.
pub fn summarize(
    records: &[ActivityRecord],
    as_of: NaiveDate,
    config: &Config,
) -> Vec<InternSummary> {
    let mut by_intern: BTreeMap<&InternId, Vec<ActivityRecord>> = BTreeMap::new();
    for record in records {
        by_intern
            .entry(&record.intern_id)
            .or_default()
            .push(record.clone());
    }

    by_intern
        .into_par_iter()
        .map(|(intern_id, records)| InternSummary {
            intern_id: intern_id.clone(),
            stats: calculate_stats(&records, as_of),
            eligibility: calculate_eligibility(
                &records,
                config.joining_date(intern_id),
                &config.policy,
            ),
        })
        .collect()
}

/// Formats the review table for terminal output.
pub fn format_review(as_of: NaiveDate, summaries: &[InternSummary]) -> String {
    let mut output = String::new();
    writeln!(output, "INTERN REVIEW (as of {as_of})").unwrap();

    if summaries.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No activity recorded yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'ilog sync' to pull records from the sheet.").unwrap();
        return output;
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<12}  {:>4}  {:>7}  {:>6}  {:>3}  ELIGIBLE",
        "INTERN", "DAYS", "AVG HRS", "STREAK", "GAP"
    )
    .unwrap();
    for summary in summaries {
        writeln!(
            output,
            "{:<12}  {:>4}  {:>7}  {:>6}  {:>3}  {}",
            summary.intern_id.as_str(),
            summary.stats.total_active_days,
            format_hours(summary.stats.average_hours),
            summary.stats.current_streak,
            summary.eligibility.max_gap_days,
            if summary.eligibility.is_eligible {
                "yes"
            } else {
                "no"
            }
        )
        .unwrap();
    }

    let eligible = summaries
        .iter()
        .filter(|s| s.eligibility.is_eligible)
        .count();
    writeln!(output).unwrap();
    writeln!(output, "{eligible} of {} intern(s) eligible.", summaries.len()).unwrap();
    output
}
