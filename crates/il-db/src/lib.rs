//! Local cache for activity records.
//!
//! Persists records with `rusqlite` so the CLI keeps working when the remote
//! sheet is unreachable.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Use one `Database` per thread or wrap it in a `Mutex`.
//!
//! # Schema
//!
//! Dates are stored as TEXT in `YYYY-MM-DD` form, so lexicographic ordering
//! matches chronological ordering. The primary key `(intern_id, date)` backs
//! the one-record-per-day rule at the storage level as well as in
//! [`il_core::check_submission`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use il_core::{
    ActivityRecord, Category, InternId, QualityScore, SubmissionError, ValidationError,
    check_submission, merge_records,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_DAY: &str = "
    SELECT intern_id, date, hours, category, description, quality_score, proof_link
    FROM activities
    WHERE intern_id = ? AND date = ?
";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The submission gate refused the record.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    /// A stored date could not be parsed.
    #[error("invalid date for {intern_id}: {date}")]
    DateParse {
        intern_id: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row failed domain validation.
    #[error("invalid stored record for {intern_id} on {date}: {source}")]
    InvalidRecord {
        intern_id: String,
        date: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Counts from a merge into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Records for days that were not cached before.
    pub inserted: usize,
    /// Cached records whose contents changed.
    pub updated: usize,
}

/// Bookkeeping for the most recent sync from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub source: String,
    pub synced_at: String,
    pub imported: i64,
}

/// A row as stored, before domain validation.
struct StoredRow {
    intern_id: String,
    date: String,
    hours: f64,
    category: String,
    description: String,
    quality_score: Option<i64>,
    proof_link: Option<String>,
}

impl StoredRow {
    fn into_record(self) -> Result<ActivityRecord, DbError> {
        let invalid = |source| DbError::InvalidRecord {
            intern_id: self.intern_id.clone(),
            date: self.date.clone(),
            source,
        };
        let intern_id = InternId::new(&self.intern_id).map_err(invalid)?;
        let category: Category = self.category.parse().map_err(invalid)?;
        let quality_score = self
            .quality_score
            .map(QualityScore::new)
            .transpose()
            .map_err(invalid)?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|source| {
            DbError::DateParse {
                intern_id: self.intern_id.clone(),
                date: self.date.clone(),
                source,
            }
        })?;
        Ok(ActivityRecord {
            intern_id,
            date,
            hours: self.hours,
            category,
            description: self.description,
            quality_score,
            proof_link: self.proof_link,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- One row per intern per calendar day
            -- date: 'YYYY-MM-DD'
            CREATE TABLE IF NOT EXISTS activities (
                intern_id TEXT NOT NULL,
                date TEXT NOT NULL,
                hours REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                quality_score INTEGER,
                proof_link TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (intern_id, date)
            );

            CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(date);

            CREATE TABLE IF NOT EXISTS sync_state (
                source TEXT PRIMARY KEY,
                synced_at TEXT NOT NULL,
                imported INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;
        Ok(())
    }

    /// Stores a new record after running the one-per-day submission gate.
    ///
    /// `today` is the submission day; records dated after it are refused.
    pub fn submit(&mut self, record: &ActivityRecord, today: NaiveDate) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        let existing = {
            let mut stmt = tx.prepare(SELECT_DAY)?;
            records_for_day(&mut stmt, &record.intern_id, record.date)?
        };
        check_submission(&existing, record, today)?;
        upsert(&tx, record)?;
        tx.commit()?;
        tracing::debug!(intern = %record.intern_id, date = %record.date, "stored submission");
        Ok(())
    }

    /// Merges records into the cache one-per-day.
    ///
    /// Incoming records replace cached ones for the same day, except that a
    /// cached quality score is kept when the incoming record is ungraded.
    /// Only the days present in `incoming` are read back from the cache.
    pub fn merge_records(&mut self, incoming: &[ActivityRecord]) -> Result<MergeStats, DbError> {
        if incoming.is_empty() {
            return Ok(MergeStats::default());
        }
        let tx = self.conn.transaction()?;
        let mut stats = MergeStats::default();
        {
            let mut lookup = tx.prepare(SELECT_DAY)?;
            // Collapse same-day duplicates within the batch first, last one wins
            for record in merge_records(&[], incoming) {
                let cached = records_for_day(&mut lookup, &record.intern_id, record.date)?;
                let Some(merged) = merge_records(&cached, std::slice::from_ref(&record)).pop()
                else {
                    continue;
                };
                match cached.first() {
                    None => stats.inserted += 1,
                    Some(previous) if *previous != merged => stats.updated += 1,
                    Some(_) => continue,
                }
                upsert(&tx, &merged)?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            inserted = stats.inserted,
            updated = stats.updated,
            "merged records into cache"
        );
        Ok(stats)
    }

    /// Lists an intern's records ordered by date.
    pub fn list_records(&self, intern_id: &InternId) -> Result<Vec<ActivityRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT intern_id, date, hours, category, description, quality_score, proof_link
            FROM activities
            WHERE intern_id = ?
            ORDER BY date ASC
            ",
        )?;
        let rows = stmt.query_map(params![intern_id.as_str()], read_row)?;
        collect_records(rows)
    }

    /// Lists every cached record ordered by intern then date.
    pub fn list_all(&self) -> Result<Vec<ActivityRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT intern_id, date, hours, category, description, quality_score, proof_link
            FROM activities
            ORDER BY intern_id ASC, date ASC
            ",
        )?;
        let rows = stmt.query_map([], read_row)?;
        collect_records(rows)
    }

    /// Lists distinct interns with at least one record.
    pub fn list_interns(&self) -> Result<Vec<InternId>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT intern_id FROM activities ORDER BY intern_id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut interns = Vec::new();
        for row in rows {
            let raw = row?;
            let id = InternId::new(&raw).map_err(|source| DbError::InvalidRecord {
                intern_id: raw.clone(),
                date: String::new(),
                source,
            })?;
            interns.push(id);
        }
        Ok(interns)
    }

    /// Lists an intern's records that have no quality score yet.
    pub fn ungraded_records(&self, intern_id: &InternId) -> Result<Vec<ActivityRecord>, DbError> {
        Ok(self
            .list_records(intern_id)?
            .into_iter()
            .filter(|r| r.quality_score.is_none())
            .collect())
    }

    /// Sets the quality score for one day. Returns `false` if no record exists.
    pub fn set_quality_score(
        &mut self,
        intern_id: &InternId,
        date: NaiveDate,
        score: QualityScore,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "
            UPDATE activities SET quality_score = ?, updated_at = ?
            WHERE intern_id = ? AND date = ?
            ",
            params![
                i64::from(score.value()),
                format_timestamp(Utc::now()),
                intern_id.as_str(),
                format_date(date),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Records a completed sync from `source`.
    pub fn record_sync(
        &mut self,
        source: &str,
        synced_at: DateTime<Utc>,
        imported: usize,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO sync_state (source, synced_at, imported) VALUES (?, ?, ?)
            ON CONFLICT(source) DO UPDATE SET synced_at = excluded.synced_at, imported = excluded.imported
            ",
            params![
                source,
                format_timestamp(synced_at),
                i64::try_from(imported).unwrap_or(i64::MAX)
            ],
        )?;
        Ok(())
    }

    /// Returns the most recent sync across all sources.
    pub fn last_sync(&self) -> Result<Option<SyncRecord>, DbError> {
        let record = self
            .conn
            .query_row(
                "
                SELECT source, synced_at, imported FROM sync_state
                ORDER BY synced_at DESC, source ASC
                LIMIT 1
                ",
                [],
                |row| {
                    Ok(SyncRecord {
                        source: row.get(0)?,
                        synced_at: row.get(1)?,
                        imported: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

fn upsert(conn: &Connection, record: &ActivityRecord) -> Result<(), DbError> {
    conn.execute(
        "
        INSERT INTO activities
        (intern_id, date, hours, category, description, quality_score, proof_link, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(intern_id, date) DO UPDATE SET
            hours = excluded.hours,
            category = excluded.category,
            description = excluded.description,
            quality_score = excluded.quality_score,
            proof_link = excluded.proof_link,
            updated_at = excluded.updated_at
        ",
        params![
            record.intern_id.as_str(),
            format_date(record.date),
            record.hours,
            record.category.as_str(),
            record.description,
            record.quality_score.map(|s| i64::from(s.value())),
            record.proof_link,
            format_timestamp(Utc::now()),
        ],
    )?;
    Ok(())
}

fn records_for_day(
    stmt: &mut rusqlite::Statement<'_>,
    intern_id: &InternId,
    date: NaiveDate,
) -> Result<Vec<ActivityRecord>, DbError> {
    let rows = stmt.query_map(params![intern_id.as_str(), format_date(date)], read_row)?;
    collect_records(rows)
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow {
        intern_id: row.get(0)?,
        date: row.get(1)?,
        hours: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        quality_score: row.get(5)?,
        proof_link: row.get(6)?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<StoredRow>>,
) -> Result<Vec<ActivityRecord>, DbError> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(intern: &str, date: &str, hours: f64) -> ActivityRecord {
        ActivityRecord {
            intern_id: InternId::new(intern).unwrap(),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            hours,
            category: Category::Development,
            description: format!("worked on {date}"),
            quality_score: None,
            proof_link: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "activities"),
            vec![
                "intern_id",
                "date",
                "hours",
                "category",
                "description",
                "quality_score",
                "proof_link",
                "updated_at",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "sync_state"),
            vec!["source", "synced_at", "imported"]
        );
    }

    #[test]
    fn reopening_file_database_keeps_records() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ilog.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.submit(&record("a1", "2024-01-01", 2.0), today()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        let records = db.list_records(&InternId::new("A1").unwrap()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn submit_rejects_second_record_same_day() {
        let mut db = Database::open_in_memory().unwrap();
        db.submit(&record("a1", "2024-01-01", 2.0), today()).unwrap();

        let err = db.submit(&record("A1", "2024-01-01", 4.0), today()).unwrap_err();
        assert!(matches!(
            err,
            DbError::Submission(SubmissionError::AlreadySubmitted { .. })
        ));

        let records = db.list_records(&InternId::new("a1").unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].hours - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn submit_rejects_invalid_hours() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db.submit(&record("a1", "2024-01-01", 0.0), today()).unwrap_err();
        assert!(matches!(
            err,
            DbError::Submission(SubmissionError::InvalidHours { .. })
        ));
    }

    #[test]
    fn submit_rejects_future_dates() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .submit(&record("a1", "2025-01-01", 2.0), today())
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Submission(SubmissionError::FutureDate { .. })
        ));
        assert!(db.list_all().unwrap().is_empty());

        db.submit(&record("a1", "2024-12-31", 2.0), today()).unwrap();
        assert_eq!(db.list_all().unwrap().len(), 1);
    }

    #[test]
    fn records_roundtrip_all_fields() {
        let mut db = Database::open_in_memory().unwrap();
        let mut original = record("a1", "2024-02-03", 3.25);
        original.category = Category::Research;
        original.quality_score = Some(QualityScore::new(9).unwrap());
        original.proof_link = Some("https://example.com/notes".to_string());
        db.submit(&original, today()).unwrap();

        let stored = db.list_all().unwrap();
        assert_eq!(stored, vec![original]);
    }

    #[test]
    fn merge_counts_inserts_and_updates() {
        let mut db = Database::open_in_memory().unwrap();
        db.submit(&record("a1", "2024-01-01", 2.0), today()).unwrap();
        db.submit(&record("a1", "2024-01-02", 2.0), today()).unwrap();

        let incoming = vec![
            record("a1", "2024-01-01", 2.0),
            record("a1", "2024-01-02", 5.0),
            record("b2", "2024-01-02", 1.0),
        ];
        let stats = db.merge_records(&incoming).unwrap();
        assert_eq!(
            stats,
            MergeStats {
                inserted: 1,
                updated: 1
            }
        );

        let again = db.merge_records(&incoming).unwrap();
        assert_eq!(again, MergeStats::default());
        assert_eq!(db.list_all().unwrap().len(), 3);
    }

    #[test]
    fn merge_collapses_same_day_duplicates_in_one_batch() {
        let mut db = Database::open_in_memory().unwrap();
        let stats = db
            .merge_records(&[
                record("a1", "2024-01-01", 1.0),
                record("A1", "2024-01-01", 6.0),
            ])
            .unwrap();
        assert_eq!(
            stats,
            MergeStats {
                inserted: 1,
                updated: 0
            }
        );
        let records = db.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].hours - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn small_merge_into_large_cache_only_reads_touched_days() {
        let mut db = Database::open_in_memory().unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let cached: Vec<ActivityRecord> = (0..100)
            .flat_map(|intern| {
                (0..150).map(move |offset| {
                    let date = first + chrono::Duration::days(offset);
                    record(&format!("in-{intern}"), &format_date(date), 2.0)
                })
            })
            .collect();
        let seeded = db.merge_records(&cached).unwrap();
        assert_eq!(seeded.inserted, 15_000);

        let started = std::time::Instant::now();
        let stats = db
            .merge_records(&[record("in-7", "2024-06-30", 3.0)])
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(
            stats,
            MergeStats {
                inserted: 1,
                updated: 0
            }
        );
        assert_eq!(db.list_all().unwrap().len(), 15_001);
        assert!(
            elapsed < std::time::Duration::from_millis(500),
            "merging one record took {elapsed:?}"
        );
    }

    #[test]
    fn merge_keeps_cached_score_for_ungraded_incoming() {
        let mut db = Database::open_in_memory().unwrap();
        db.submit(&record("a1", "2024-01-01", 2.0), today()).unwrap();
        let intern = InternId::new("a1").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(
            db.set_quality_score(&intern, date, QualityScore::new(7).unwrap())
                .unwrap()
        );

        db.merge_records(&[record("a1", "2024-01-01", 3.0)]).unwrap();
        let records = db.list_records(&intern).unwrap();
        assert_eq!(records[0].quality_score, Some(QualityScore::new(7).unwrap()));
        assert!((records[0].hours - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ungraded_records_excludes_scored_days() {
        let mut db = Database::open_in_memory().unwrap();
        db.submit(&record("a1", "2024-01-01", 2.0), today()).unwrap();
        db.submit(&record("a1", "2024-01-02", 2.0), today()).unwrap();
        let intern = InternId::new("a1").unwrap();
        db.set_quality_score(
            &intern,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            QualityScore::NEUTRAL,
        )
        .unwrap();

        let ungraded = db.ungraded_records(&intern).unwrap();
        assert_eq!(ungraded.len(), 1);
        assert_eq!(ungraded[0].date.to_string(), "2024-01-02");
    }

    #[test]
    fn set_quality_score_reports_missing_day() {
        let mut db = Database::open_in_memory().unwrap();
        let updated = db
            .set_quality_score(
                &InternId::new("nobody").unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                QualityScore::NEUTRAL,
            )
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn list_interns_is_sorted_and_distinct() {
        let mut db = Database::open_in_memory().unwrap();
        db.submit(&record("zed", "2024-01-01", 2.0), today()).unwrap();
        db.submit(&record("amy", "2024-01-01", 2.0), today()).unwrap();
        db.submit(&record("amy", "2024-01-02", 2.0), today()).unwrap();

        let interns: Vec<String> = db
            .list_interns()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(interns, vec!["AMY", "ZED"]);
    }

    #[test]
    fn last_sync_returns_latest_entry() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.last_sync().unwrap(), None);

        let early = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let late = DateTime::parse_from_rfc3339("2024-01-02T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        db.record_sync("https://a.example", early, 3).unwrap();
        db.record_sync("https://b.example", late, 5).unwrap();

        let last = db.last_sync().unwrap().unwrap();
        assert_eq!(last.source, "https://b.example");
        assert_eq!(last.synced_at, "2024-01-02T00:00:00.000Z");
        assert_eq!(last.imported, 5);
    }
}
