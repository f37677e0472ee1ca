//! List command for an intern's cached records.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use clap::Args;
use il_core::{ActivityRecord, InternId, ProofKind};
use il_db::Database;

use crate::commands::util::{format_hours, write_json};

/// Longest description shown in the table view.
const MAX_DESCRIPTION_WIDTH: usize = 48;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Intern ID (case-insensitive).
    #[arg(long)]
    pub intern: InternId,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &ListArgs) -> Result<()> {
    let records = db.list_records(&args.intern)?;
    if args.json {
        return write_json(writer, &records);
    }
    write!(writer, "{}", format_records(&args.intern, &records))?;
    Ok(())
}

/// Formats records as a table, oldest first.
pub fn format_records(intern: &InternId, records: &[ActivityRecord]) -> String {
    let mut output = String::new();
    if records.is_empty() {
        writeln!(output, "No activity recorded for {intern}.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<10}  {:>5}  {:<13}  {:>5}  {:<5}  DESCRIPTION",
        "DATE", "HOURS", "CATEGORY", "SCORE", "PROOF"
    )
    .unwrap();
    for record in records {
        let score = record
            .quality_score
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let proof = match record.proof_kind() {
            Some(ProofKind::Url) => "link",
            Some(ProofKind::EmbeddedImage) => "image",
            Some(ProofKind::Other) => "note",
            None => "-",
        };
        writeln!(
            output,
            "{:<10}  {:>5}  {:<13}  {:>5}  {:<5}  {}",
            record.date,
            format_hours(record.hours),
            record.category.as_str(),
            score,
            proof,
            truncate(&record.description, MAX_DESCRIPTION_WIDTH)
        )
        .unwrap();
    }
    output
}

fn truncate(text: &str, max: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
