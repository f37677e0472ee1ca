//! Sync command for pulling sheet records into the local cache.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use il_core::InternId;
use il_db::Database;
use il_remote::SheetClient;

use crate::Config;
use crate::commands::util::runtime;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Only pull records for this intern.
    #[arg(long)]
    pub intern: Option<InternId>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Records were fetched and merged.
    Synced {
        fetched: usize,
        inserted: usize,
        updated: usize,
        skipped: usize,
    },
    /// The sheet could not be read; cached records are unchanged.
    Offline { cached: usize },
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &SyncArgs,
    config: &Config,
) -> Result<SyncOutcome> {
    let url = config
        .sheet_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing sheet URL (set ILOG_SHEET_URL or config.toml)"))?;
    let client = SheetClient::new(url).context("failed to create sheet client")?;

    let fetched = runtime()?.block_on(client.fetch_records(args.intern.as_ref()));
    let report = match fetched {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!(url = %client.url(), error = %err, "sheet fetch failed, using cache");
            let cached = match &args.intern {
                Some(intern) => db.list_records(intern)?.len(),
                None => db.list_all()?.len(),
            };
            writeln!(
                writer,
                "Sheet unavailable ({err}); using {cached} cached record(s)."
            )?;
            return Ok(SyncOutcome::Offline { cached });
        }
    };

    let stats = db.merge_records(&report.records)?;
    db.record_sync(client.url(), Utc::now(), stats.inserted + stats.updated)?;
    writeln!(
        writer,
        "Synced {} record(s) from {} ({} new, {} updated, {} skipped).",
        report.records.len(),
        client.url(),
        stats.inserted,
        stats.updated,
        report.skipped
    )?;

    Ok(SyncOutcome::Synced {
        fetched: report.records.len(),
        inserted: stats.inserted,
        updated: stats.updated,
        skipped: report.skipped,
    })
}
