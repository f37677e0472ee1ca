//! Intern activity log CLI library.
//!
//! This crate provides the CLI interface for the activity log.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, DEFAULT_MODEL};
