//! Claude API integration for grading activity descriptions.
//!
//! Each logged activity can be given a [`QualityScore`] from 1 to 10 based on
//! how specific and substantive its description is. Callers decide what to
//! do on failure; the CLI falls back to [`QualityScore::NEUTRAL`].

use std::fmt;
use std::time::Duration;

use il_core::{ActivityRecord, QualityScore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const SCORE_MAX_TOKENS: u32 = 100;
const SCORE_TEMPERATURE: f32 = 0.0;
/// Descriptions longer than this are cut before prompting.
const MAX_DESCRIPTION_CHARS: usize = 2_000;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Claude API client.
///
/// # Thread Safety
///
/// The client is safe to share across threads. Requests reuse the underlying
/// HTTP connection pool.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(LlmError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            base_url: ANTHROPIC_API_URL.to_string(),
        })
    }

    /// Points the client at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Grades one activity description.
    pub async fn score_activity(
        &self,
        model: &str,
        input: &ScoreRequest,
    ) -> Result<QualityScore, LlmError> {
        let request = MessageRequest {
            model: model.to_string(),
            max_tokens: SCORE_MAX_TOKENS,
            temperature: SCORE_TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content: build_score_prompt(input),
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| LlmError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: MessageResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        let text = extract_text(payload.content)?;
        let score = parse_score(&text)?;
        tracing::debug!(score = score.value(), "scored activity");
        Ok(score)
    }
}

/// What the scorer sees about an activity.
#[derive(Debug, Clone)]
pub struct ScoreRequest {
    pub category: String,
    pub hours: f64,
    pub description: String,
}

impl From<&ActivityRecord> for ScoreRequest {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            category: record.category.to_string(),
            hours: record.hours,
            description: record.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

fn extract_text(blocks: Vec<ContentBlock>) -> Result<String, LlmError> {
    let mut pieces = Vec::new();
    for block in blocks {
        let ContentBlock::Text { text } = block;
        pieces.push(text);
    }
    if pieces.is_empty() {
        return Err(LlmError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<LlmError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| LlmError::Api {
            message: payload.error.message,
        })
}

fn build_score_prompt(input: &ScoreRequest) -> String {
    let description: String = input
        .description
        .trim()
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect();

    let mut lines = Vec::new();
    lines.push(
        "You review daily work logs written by interns. Grade the entry below.".to_string(),
    );
    lines.push("Return strict JSON: {\"score\": n} where n is an integer from 1 to 10.".to_string());
    lines.push("Rules:".to_string());
    lines.push("- 1-3: vague or empty (\"worked on stuff\").".to_string());
    lines.push("- 4-6: names the task but not the outcome.".to_string());
    lines.push("- 7-10: specific tasks, concrete results, plausible for the hours logged.".to_string());
    lines.push(String::new());
    lines.push(format!("category: {}", input.category));
    lines.push(format!("hours: {}", input.hours));
    lines.push(format!("description: {description}"));
    lines.join("\n")
}

/// Reads `{"score": n}`, tolerating prose around the JSON object or a bare number.
fn parse_score(text: &str) -> Result<QualityScore, LlmError> {
    #[derive(Deserialize)]
    struct Payload {
        score: f64,
    }

    let trimmed = text.trim();
    let object = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    if let Ok(payload) = serde_json::from_str::<Payload>(object) {
        return Ok(QualityScore::clamped(payload.score));
    }
    trimmed
        .parse::<f64>()
        .map(QualityScore::clamped)
        .map_err(|_| LlmError::InvalidResponse(format!("no score in response: {trimmed}")))
}
