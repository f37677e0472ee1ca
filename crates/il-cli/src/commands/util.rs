//! Shared utilities for CLI commands.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

/// The current calendar day in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Uses the explicit date if given, otherwise today.
pub fn resolve_today(explicit: Option<NaiveDate>) -> NaiveDate {
    explicit.unwrap_or_else(today)
}

/// Writes a value as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Formats hours with one decimal place.
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.1}")
}

/// Formats a day count as "1 day" or "N days".
pub fn plural_days<N: fmt::Display + PartialEq + From<u8>>(count: N) -> String {
    if count == N::from(1) {
        "1 day".to_string()
    } else {
        format!("{count} days")
    }
}

/// Creates a runtime for the async HTTP clients.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    use anyhow::Context;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_today_prefers_explicit_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(resolve_today(Some(date)), date);
    }

    #[test]
    fn format_hours_uses_one_decimal() {
        assert_eq!(format_hours(2.0), "2.0");
        assert_eq!(format_hours(2.46), "2.5");
    }

    #[test]
    fn plural_days_handles_one() {
        assert_eq!(plural_days(1_usize), "1 day");
        assert_eq!(plural_days(0_i64), "0 days");
        assert_eq!(plural_days(12_usize), "12 days");
    }

    #[test]
    fn write_json_appends_newline() {
        let mut output = Vec::new();
        write_json(&mut output, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "{\n  \"a\": 1\n}\n");
    }
}
