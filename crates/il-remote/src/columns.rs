//! Mapping loosely-labelled spreadsheet rows onto [`ActivityRecord`]s.
//!
//! Sheet headers drift over time ("Intern ID", "intern_id", "Hours Worked",
//! ...). Headers are compared after lower-casing and stripping everything but
//! ASCII letters and digits. Each field first looks for an exact alias, then
//! for a header containing one of its fragments.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use il_core::record::hours_from_json;
use il_core::{ActivityRecord, Category, InternId, QualityScore};
use regex::Regex;
use serde_json::{Map, Value};

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static ISO_DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").unwrap());

struct Field {
    exact: &'static [&'static str],
    fragments: &'static [&'static str],
}

const INTERN_ID: Field = Field {
    exact: &["internid", "intern", "id", "studentid", "email", "emailaddress"],
    fragments: &["internid", "intern"],
};
const DATE: Field = Field {
    exact: &["date", "activitydate", "day", "timestamp"],
    fragments: &["date"],
};
const HOURS: Field = Field {
    exact: &["hours", "hrs", "hoursworked", "duration"],
    fragments: &["hour"],
};
const CATEGORY: Field = Field {
    exact: &["category", "type", "worktype"],
    fragments: &["category"],
};
const DESCRIPTION: Field = Field {
    exact: &["description", "summary", "details", "task", "work"],
    fragments: &["description", "summary"],
};
const QUALITY_SCORE: Field = Field {
    exact: &["qualityscore", "score", "aiscore", "quality"],
    fragments: &["score"],
};
const PROOF_LINK: Field = Field {
    exact: &["prooflink", "proof", "link", "url", "evidence"],
    fragments: &["proof"],
};

/// Records recovered from a batch of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRows {
    pub records: Vec<ActivityRecord>,
    /// Rows missing an intern or a parseable date, or not JSON objects.
    pub skipped: usize,
}

/// Normalizes raw sheet rows, optionally keeping only one intern.
pub fn normalize_rows(rows: &[Value], intern: Option<&InternId>) -> NormalizedRows {
    let mut normalized = NormalizedRows::default();
    for (idx, row) in rows.iter().enumerate() {
        let Some(record) = row.as_object().and_then(normalize_row) else {
            tracing::warn!(row = idx + 1, "skipping sheet row without intern or date");
            normalized.skipped += 1;
            continue;
        };
        if intern.is_some_and(|wanted| *wanted != record.intern_id) {
            continue;
        }
        normalized.records.push(record);
    }
    normalized
}

fn normalize_row(row: &Map<String, Value>) -> Option<ActivityRecord> {
    let headers: Vec<(String, &Value)> = row
        .iter()
        .map(|(key, value)| (normalize_header(key), value))
        .collect();

    let intern_id = lookup(&headers, &INTERN_ID)
        .and_then(value_as_text)
        .and_then(|raw| InternId::new(raw).ok())?;
    let date = lookup(&headers, &DATE).and_then(value_as_text).and_then(|raw| parse_date(&raw))?;
    let hours = lookup(&headers, &HOURS).map_or(0.0, hours_from_json);
    let category = lookup(&headers, &CATEGORY)
        .and_then(value_as_text)
        .map_or(Category::Other, |label| Category::from_label_lossy(&label));
    let description = lookup(&headers, &DESCRIPTION)
        .and_then(value_as_text)
        .unwrap_or_default();
    let quality_score = lookup(&headers, &QUALITY_SCORE).and_then(parse_score);
    let proof_link = lookup(&headers, &PROOF_LINK).and_then(value_as_text);

    Some(ActivityRecord {
        intern_id,
        date,
        hours,
        category,
        description,
        quality_score,
        proof_link,
    })
}

fn normalize_header(header: &str) -> String {
    NON_ALNUM_RE
        .replace_all(&header.to_lowercase(), "")
        .into_owned()
}

fn lookup<'a>(headers: &[(String, &'a Value)], field: &Field) -> Option<&'a Value> {
    let exact = field.exact.iter().find_map(|alias| {
        headers
            .iter()
            .find(|(header, _)| header == alias)
            .map(|(_, value)| *value)
    });
    exact.or_else(|| {
        field.fragments.iter().find_map(|fragment| {
            headers
                .iter()
                .find(|(header, _)| header.contains(fragment))
                .map(|(_, value)| *value)
        })
    })
}

/// Non-empty trimmed text for strings and numbers.
fn value_as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `M/D/YYYY`.
///
/// Timestamps keep the calendar day as written rather than converting zones.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_PREFIX_RE.captures(raw) {
        return NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc2822(raw) {
        return Some(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Scores of zero or below mean "not graded yet".
fn parse_score(value: &Value) -> Option<QualityScore> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (raw > 0.0).then(|| QualityScore::clamped(raw))
}
