//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The quality score was out of range.
    #[error("quality score must be between 1 and 10, got {value}")]
    ScoreOutOfRange { value: i64 },

    /// The category label is not one of the known categories.
    #[error("unknown category: {value}")]
    UnknownCategory { value: String },
}

/// A normalized intern identifier.
///
/// Identifiers are compared case-insensitively in practice, so they are stored
/// trimmed and upper-cased. `" ab12 "` and `"AB12"` are the same intern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InternId(String);

impl InternId {
    /// Creates a new ID after normalization and validation.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ValidationError> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "intern ID" });
        }
        Ok(Self(id.to_uppercase()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InternId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InternId> for String {
    fn from(id: InternId) -> Self {
        id.0
    }
}

impl fmt::Display for InternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for InternId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for InternId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Work classification for a logged activity.
///
/// The metrics engine ignores the category; it exists for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Learning,
    Development,
    Research,
    Documentation,
    Meeting,
    Testing,
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 7] = [
        Self::Learning,
        Self::Development,
        Self::Research,
        Self::Documentation,
        Self::Meeting,
        Self::Testing,
        Self::Other,
    ];

    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Development => "development",
            Self::Research => "research",
            Self::Documentation => "documentation",
            Self::Meeting => "meeting",
            Self::Testing => "testing",
            Self::Other => "other",
        }
    }

    /// Parses a label, mapping anything unrecognized to [`Category::Other`].
    ///
    /// Used for spreadsheet rows, where labels are free-form.
    #[must_use]
    pub fn from_label_lossy(label: &str) -> Self {
        label.parse().unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| ValidationError::UnknownCategory {
                value: s.to_string(),
            })
    }
}

/// A quality grade in the range \[1, 10\] assigned by an external scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualityScore(u8);

impl QualityScore {
    /// The lowest grade.
    pub const MIN: Self = Self(1);

    /// The highest grade.
    pub const MAX: Self = Self(10);

    /// Grade used when the scorer is unavailable.
    pub const NEUTRAL: Self = Self(5);

    /// Creates a score after validation.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if (1..=10).contains(&v) => Ok(Self(v)),
            _ => Err(ValidationError::ScoreOutOfRange { value }),
        }
    }

    /// Creates a score by rounding and clamping to \[1, 10\].
    ///
    /// NaN becomes the minimum grade.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to 1..=10 before the cast"
    )]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.round().clamp(1.0, 10.0) as u8)
    }

    /// Returns the inner value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

impl From<QualityScore> for u8 {
    fn from(score: QualityScore) -> Self {
        score.0
    }
}

impl Serialize for QualityScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QualityScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        // Scores come from third-party output; clamp rather than reject
        Ok(Self::clamped(value))
    }
}
