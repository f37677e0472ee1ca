//! Grade activity descriptions with the Claude API.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use il_core::{ActivityRecord, InternId, QualityScore};
use il_db::Database;
use il_llm::{Client, ScoreRequest};
use tokio::runtime::Runtime;

use crate::Config;
use crate::commands::util::runtime;

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Intern ID (case-insensitive).
    #[arg(long)]
    pub intern: InternId,
}

/// A scoring client bundled with the runtime that drives it.
pub struct Scorer {
    client: Client,
    model: String,
    runtime: Runtime,
}

impl Scorer {
    /// Builds a scorer when an API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        let mut client = Client::new(api_key).context("failed to create LLM client")?;
        if let Some(base_url) = &config.api_base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(Some(Self {
            client,
            model: config.model.clone(),
            runtime: runtime()?,
        }))
    }

    /// Scores a record, falling back to [`QualityScore::NEUTRAL`] on any error.
    pub fn score_or_neutral(&self, record: &ActivityRecord) -> QualityScore {
        let request = ScoreRequest::from(record);
        match self
            .runtime
            .block_on(self.client.score_activity(&self.model, &request))
        {
            Ok(score) => score,
            Err(err) => {
                tracing::warn!(
                    intern = %record.intern_id,
                    date = %record.date,
                    error = %err,
                    "scoring failed, using neutral score"
                );
                QualityScore::NEUTRAL
            }
        }
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &ScoreArgs,
    config: &Config,
) -> Result<usize> {
    let scorer = Scorer::from_config(config)?.ok_or_else(|| {
        anyhow::anyhow!("missing Claude API key (set ILOG_API_KEY or config.toml)")
    })?;

    let ungraded = db.ungraded_records(&args.intern)?;
    if ungraded.is_empty() {
        writeln!(writer, "No ungraded records for {}.", args.intern)?;
        return Ok(0);
    }

    for record in &ungraded {
        let score = scorer.score_or_neutral(record);
        db.set_quality_score(&record.intern_id, record.date, score)?;
        writeln!(writer, "{}  {score}", record.date)?;
    }
    writeln!(
        writer,
        "Scored {} record(s) for {}.",
        ungraded.len(),
        args.intern
    )?;
    Ok(ungraded.len())
}
