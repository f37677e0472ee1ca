//! Log command for submitting a day's activity.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use il_core::{ActivityRecord, Category, InternId, QualityScore};
use il_db::Database;

use crate::Config;
use crate::commands::score::Scorer;
use crate::commands::util::{format_hours, resolve_today, today};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Intern ID (case-insensitive).
    #[arg(long)]
    pub intern: InternId,

    /// Hours worked (greater than 0, at most 24).
    #[arg(long)]
    pub hours: f64,

    /// Work category.
    #[arg(long)]
    pub category: Category,

    /// What was done.
    #[arg(long)]
    pub description: String,

    /// Link or embedded image backing the entry.
    #[arg(long)]
    pub proof: Option<String>,

    /// Day being logged (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl LogArgs {
    fn to_record(&self) -> ActivityRecord {
        ActivityRecord {
            intern_id: self.intern.clone(),
            date: resolve_today(self.date),
            hours: self.hours,
            category: self.category,
            description: self.description.trim().to_string(),
            quality_score: None,
            proof_link: self
                .proof
                .as_deref()
                .map(str::trim)
                .filter(|link| !link.is_empty())
                .map(str::to_string),
        }
    }
}

/// Stores the submission and, when a scorer is configured, grades it.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &LogArgs,
    config: &Config,
) -> Result<Option<QualityScore>> {
    let record = args.to_record();
    db.submit(&record, today())?;
    writeln!(
        writer,
        "Logged {}h of {} for {} on {}.",
        format_hours(record.hours),
        record.category,
        record.intern_id,
        record.date
    )?;

    let Some(scorer) = Scorer::from_config(config)? else {
        return Ok(None);
    };
    let score = scorer.score_or_neutral(&record);
    db.set_quality_score(&record.intern_id, record.date, score)?;
    writeln!(writer, "Quality score: {score}")?;
    Ok(Some(score))
}
