//! Record fixtures shared by unit tests.

use chrono::NaiveDate;

use crate::record::ActivityRecord;
use crate::types::{Category, InternId};

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn record(date: &str, hours: f64) -> ActivityRecord {
    record_for("INT-1", date, hours)
}

pub fn record_for(intern: &str, date: &str, hours: f64) -> ActivityRecord {
    ActivityRecord {
        intern_id: InternId::new(intern).unwrap(),
        date: day(date),
        hours,
        category: Category::Development,
        description: format!("work on {date}"),
        quality_score: None,
        proof_link: None,
    }
}

/// `count` consecutive daily records ending on `last`, oldest first.
pub fn consecutive(last: &str, count: u32, hours: f64) -> Vec<ActivityRecord> {
    let last = day(last);
    (0..count)
        .rev()
        .map(|offset| {
            let date = last - chrono::Duration::days(i64::from(offset));
            record(&date.format("%Y-%m-%d").to_string(), hours)
        })
        .collect()
}
