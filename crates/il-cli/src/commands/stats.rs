//! Stats command for an intern's activity metrics.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use il_core::{InternId, Statistics, calculate_stats};
use il_db::Database;
use serde::Serialize;

use crate::commands::util::{format_hours, plural_days, resolve_today, write_json};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Intern ID (case-insensitive).
    #[arg(long)]
    pub intern: InternId,

    /// Compute the streak as of this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    intern_id: &'a InternId,
    as_of: NaiveDate,
    #[serde(flatten)]
    stats: Statistics,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &StatsArgs) -> Result<()> {
    let records = db.list_records(&args.intern)?;
    let as_of = resolve_today(args.today);
    let stats = calculate_stats(&records, as_of);
    tracing::debug!(intern = %args.intern, records = records.len(), "computed stats");

    if args.json {
        return write_json(
            writer,
            &StatsOutput {
                intern_id: &args.intern,
                as_of,
                stats,
            },
        );
    }
    write!(writer, "{}", format_stats(&args.intern, as_of, &stats))?;
    Ok(())
}

/// Formats statistics for terminal output.
pub fn format_stats(intern: &InternId, as_of: NaiveDate, stats: &Statistics) -> String {
    let mut output = String::new();
    writeln!(output, "STATS: {intern} (as of {as_of})").unwrap();
    writeln!(output, "Active days:    {}", stats.total_active_days).unwrap();
    writeln!(output, "Average hours:  {}", format_hours(stats.average_hours)).unwrap();
    writeln!(output, "Current streak: {}", plural_days(stats.current_streak)).unwrap();
    writeln!(output, "Submissions:    {}", stats.total_submissions).unwrap();
    if stats.total_submissions > stats.total_active_days {
        writeln!(
            output,
            "Warning: {} extra submission(s) on already-active days.",
            stats.total_submissions - stats.total_active_days
        )
        .unwrap();
    }
    output
}
