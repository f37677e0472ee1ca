//! Daily activity records.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Category, InternId, QualityScore};

/// One logged day of work for an intern.
///
/// At most one record should exist per `(intern_id, date)`. The engine does
/// not enforce this; see [`crate::check_submission`] and [`crate::merge_records`].
///
/// Deserialization also accepts camelCase field names (`internId`,
/// `qualityScore`, `proofLink`) as exported by the web app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Who logged the activity.
    #[serde(alias = "internId")]
    pub intern_id: InternId,
    /// Calendar day of the activity. No time-of-day component.
    pub date: NaiveDate,
    /// Hours worked. Always finite and non-negative.
    #[serde(default, deserialize_with = "deserialize_hours")]
    pub hours: f64,
    /// Work classification.
    pub category: Category,
    /// Free-text summary of the work.
    #[serde(default)]
    pub description: String,
    /// Grade from the external scorer, if graded.
    #[serde(default, alias = "qualityScore", skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<QualityScore>,
    /// A URL or an embedded image payload.
    #[serde(default, alias = "proofLink", skip_serializing_if = "Option::is_none")]
    pub proof_link: Option<String>,
}

/// What a proof link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    /// An `http(s)` link.
    Url,
    /// An inline `data:image/...` payload.
    EmbeddedImage,
    /// Anything else.
    Other,
}

impl ActivityRecord {
    /// Classifies the proof link, if present.
    pub fn proof_kind(&self) -> Option<ProofKind> {
        let link = self.proof_link.as_deref()?.trim();
        if link.is_empty() {
            return None;
        }
        let lowered = link.to_ascii_lowercase();
        let kind = if lowered.starts_with("data:image/") {
            ProofKind::EmbeddedImage
        } else if lowered.starts_with("http://") || lowered.starts_with("https://") {
            ProofKind::Url
        } else {
            ProofKind::Other
        };
        Some(kind)
    }
}

/// Coerces an hours value to a finite, non-negative number.
pub fn sanitize_hours(hours: f64) -> f64 {
    if hours.is_finite() && hours > 0.0 {
        hours
    } else {
        0.0
    }
}

/// Parses hours from loosely-typed input, defaulting to zero.
pub fn hours_from_json(value: &serde_json::Value) -> f64 {
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    sanitize_hours(raw)
}

fn deserialize_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(hours_from_json(&value))
}
