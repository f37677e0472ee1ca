//! CLI subcommand implementations.

pub mod eligibility;
pub mod import;
pub mod list;
pub mod log;
pub mod review;
pub mod score;
pub mod stats;
pub mod sync;
#[cfg(test)]
mod test_support;
pub mod util;
