//! Combining cached and remotely fetched records.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::record::ActivityRecord;
use crate::types::InternId;

/// Merges two record sets keyed by `(intern_id, date)`.
///
/// `incoming` wins for every field except `quality_score`, which is kept from
/// `existing` when the incoming record has none. Within each slice, later
/// records replace earlier ones. The result is sorted by intern, then date,
/// and contains at most one record per key.
///
/// Merging the same `incoming` twice is a no-op the second time.
pub fn merge_records(
    existing: &[ActivityRecord],
    incoming: &[ActivityRecord],
) -> Vec<ActivityRecord> {
    let mut merged: BTreeMap<(InternId, NaiveDate), ActivityRecord> = BTreeMap::new();

    for record in existing {
        merged.insert(key(record), record.clone());
    }

    for record in incoming {
        let mut record = record.clone();
        if let Some(previous) = merged.get(&key(&record)) {
            if record.quality_score.is_none() {
                record.quality_score = previous.quality_score;
            }
        }
        merged.insert(key(&record), record);
    }

    merged.into_values().collect()
}

fn key(record: &ActivityRecord) -> (InternId, NaiveDate) {
    (record.intern_id.clone(), record.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{record, record_for};
    use crate::types::QualityScore;

    #[test]
    fn incoming_replaces_existing_for_same_day() {
        let local = vec![record("2024-01-01", 2.0)];
        let remote = vec![record("2024-01-01", 4.0)];
        let merged = merge_records(&local, &remote);
        assert_eq!(merged.len(), 1);
        assert!((merged[0].hours - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn local_score_survives_ungraded_remote() {
        let mut local = record("2024-01-01", 2.0);
        local.quality_score = Some(QualityScore::new(8).unwrap());
        let remote = record("2024-01-01", 3.0);

        let merged = merge_records(&[local], &[remote.clone()]);
        assert_eq!(merged[0].quality_score, Some(QualityScore::new(8).unwrap()));

        let mut graded_remote = remote;
        graded_remote.quality_score = Some(QualityScore::new(3).unwrap());
        let merged = merge_records(&merged, &[graded_remote]);
        assert_eq!(merged[0].quality_score, Some(QualityScore::new(3).unwrap()));
    }

    #[test]
    fn output_is_sorted_and_keeps_distinct_interns() {
        let local = vec![
            record_for("b", "2024-01-02", 1.0),
            record_for("a", "2024-01-03", 1.0),
        ];
        let remote = vec![
            record_for("a", "2024-01-01", 1.0),
            record_for("b", "2024-01-02", 5.0),
        ];
        let merged = merge_records(&local, &remote);
        let keys: Vec<_> = merged
            .iter()
            .map(|r| (r.intern_id.as_str().to_string(), r.date.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A".to_string(), "2024-01-01".to_string()),
                ("A".to_string(), "2024-01-03".to_string()),
                ("B".to_string(), "2024-01-02".to_string()),
            ]
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let mut local = record("2024-01-01", 2.0);
        local.quality_score = Some(QualityScore::NEUTRAL);
        let local = vec![local, record("2024-01-02", 1.0)];
        let remote = vec![record("2024-01-01", 3.0), record("2024-01-05", 6.0)];

        let once = merge_records(&local, &remote);
        let twice = merge_records(&once, &remote);
        assert_eq!(once, twice);
    }

    #[test]
    fn later_duplicate_in_one_batch_wins() {
        let records = vec![
            record("2024-01-01", 1.0),
            record("2024-01-01", 7.0),
            record("2024-01-02", 2.0),
        ];
        let merged = merge_records(&[], &records);
        assert_eq!(merged.len(), 2);
        assert!((merged[0].hours - 7.0).abs() < f64::EPSILON);
    }
}
