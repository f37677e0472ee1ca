//! Configuration loading and management.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use il_core::{EligibilityPolicy, InternId};
use serde::{Deserialize, Serialize};

/// Model used for quality scoring unless configured otherwise.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the local cache database.
    pub database_path: PathBuf,

    /// Endpoint serving the activity sheet as JSON.
    #[serde(default)]
    pub sheet_url: Option<String>,

    /// Claude API key for quality scoring.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Claude model used for quality scoring.
    #[serde(default = "default_model")]
    pub model: String,

    /// Overrides the Claude API endpoint, e.g. for a proxy.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Certification thresholds.
    #[serde(default)]
    pub policy: EligibilityPolicy,

    /// Joining date per intern, written as quoted `"YYYY-MM-DD"` strings.
    /// Used when `policy.gap_origin` is `joining_date`.
    #[serde(default)]
    pub joining_dates: BTreeMap<InternId, NaiveDate>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("sheet_url", &self.sheet_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("policy", &self.policy)
            .field("joining_dates", &self.joining_dates)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("ilog.db"),
            sheet_url: None,
            api_key: None,
            model: default_model(),
            api_base_url: None,
            policy: EligibilityPolicy::default(),
            joining_dates: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ILOG_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("ILOG_").split("__"));

        figment.extract()
    }

    /// Joining date for `intern`, if configured.
    pub fn joining_date(&self, intern: &InternId) -> Option<NaiveDate> {
        self.joining_dates.get(intern).copied()
    }

    /// The API key, if set to something non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Returns the platform-specific config directory for ilog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ilog"))
}

/// Returns the platform-specific data directory for ilog.
///
/// On Linux: `~/.local/share/ilog`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ilog"))
}
