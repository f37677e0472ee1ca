//! Spreadsheet-backed record source.
//!
//! The sheet is published through an HTTP endpoint that returns its rows as
//! JSON, either as a bare array or wrapped as `{"data": [...]}`. Rows are
//! normalized into [`ActivityRecord`]s by [`normalize_rows`].

mod columns;

use std::fmt;
use std::time::Duration;

use il_core::{ActivityRecord, InternId};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use columns::{NormalizedRows, normalize_rows};

/// Default request timeout for sheet fetches.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest response body echoed back in an error.
const MAX_ERROR_BODY: usize = 200;

/// Remote source errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The sheet URL was empty or not http(s).
    #[error("invalid sheet URL: {url}")]
    InvalidUrl { url: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("sheet returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// The body was not a row list.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// HTTP client for the activity sheet.
pub struct SheetClient {
    http: reqwest::Client,
    url: String,
}

impl fmt::Debug for SheetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Result of one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub records: Vec<ActivityRecord>,
    /// Rows that could not be normalized.
    pub skipped: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SheetPayload {
    Rows(Vec<Value>),
    Wrapped { data: Vec<Value> },
    Records { records: Vec<Value> },
}

impl SheetPayload {
    fn into_rows(self) -> Vec<Value> {
        match self {
            Self::Rows(rows) | Self::Wrapped { data: rows } | Self::Records { records: rows } => {
                rows
            }
        }
    }
}

impl SheetClient {
    /// Creates a client for the sheet endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, RemoteError> {
        let url = url.into().trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RemoteError::InvalidUrl { url });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(RemoteError::ClientBuild)?;

        Ok(Self { http, url })
    }

    /// The endpoint this client reads from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches and normalizes all rows, optionally for a single intern.
    pub async fn fetch_records(
        &self,
        intern: Option<&InternId>,
    ) -> Result<FetchReport, RemoteError> {
        let mut request = self.http.get(&self.url);
        if let Some(intern) = intern {
            request = request.query(&[("internId", intern.as_str())]);
        }
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let rows = parse_rows(&body)?;
        let NormalizedRows { records, skipped } = normalize_rows(&rows, intern);
        tracing::debug!(
            url = %self.url,
            rows = rows.len(),
            records = records.len(),
            skipped,
            "fetched sheet rows"
        );
        Ok(FetchReport { records, skipped })
    }
}

fn parse_rows(body: &str) -> Result<Vec<Value>, RemoteError> {
    serde_json::from_str::<SheetPayload>(body)
        .map(SheetPayload::into_rows)
        .map_err(|_| RemoteError::InvalidResponse("expected a JSON array of rows".to_string()))
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
