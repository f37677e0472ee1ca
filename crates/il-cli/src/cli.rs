//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::eligibility::EligibilityArgs;
use crate::commands::list::ListArgs;
use crate::commands::log::LogArgs;
use crate::commands::review::ReviewArgs;
use crate::commands::score::ScoreArgs;
use crate::commands::stats::StatsArgs;
use crate::commands::sync::SyncArgs;

/// Intern activity log.
///
/// Interns log one activity per day; admins review active days, average
/// hours and gaps against the certification policy.
#[derive(Debug, Parser)]
#[command(name = "ilog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log today's activity (one submission per day).
    Log(LogArgs),

    /// List cached records for an intern.
    List(ListArgs),

    /// Show activity statistics for an intern.
    Stats(StatsArgs),

    /// Check certificate eligibility for an intern.
    Eligibility(EligibilityArgs),

    /// Summarize every intern for admin review.
    ///
    /// Joining dates are read from `joining_dates` in the config file. Interns
    /// without one have gaps measured from their first activity.
    Review(ReviewArgs),

    /// Import JSONL activity records from stdin.
    Import,

    /// Pull records from the activity sheet into the local cache.
    Sync(SyncArgs),

    /// Grade ungraded records with the quality scorer.
    Score(ScoreArgs),
}
