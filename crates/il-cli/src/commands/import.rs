//! Import command for loading JSONL records into the local cache.

use std::io::BufRead;

use anyhow::{Context, Result};
use il_core::ActivityRecord;
use il_db::{Database, MergeStats};

/// Reads one JSON record per line from `reader` and merges them one-per-day.
pub fn run<R: BufRead>(reader: R, db: &mut Database) -> Result<MergeStats> {
    let records = parse_records(reader)?;
    let stats = db.merge_records(&records)?;
    Ok(stats)
}

pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<ActivityRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: ActivityRecord = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid record on line {}", idx + 1))?;
        records.push(record);
    }
    Ok(records)
}
