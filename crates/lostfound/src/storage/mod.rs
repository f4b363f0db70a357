//! Storage layer for lostfound.
//!
//! This module provides `SQLite`-based persistent storage for lost-item
//! reports. Every operation opens its own connection and drops it before
//! returning, so a [`Storage`] is just a path and is cheap to clone.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::report::{parse_created_at, Metrics, NewReport, Report, StatusUpdate, CREATED_AT_FORMAT};
use crate::tracking;

use self::schema::REPORT_COLUMNS;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage engine for reports.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Report creation with generated tracking ids
/// - Exact lookup by tracking id
/// - Recency-ordered listing
/// - Status flag updates
/// - Aggregate metrics
#[derive(Debug, Clone)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let storage = Self { path };
        let conn = storage.connect()?;

        // WAL is persistent, so setting it once here covers later connections.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", storage.path.display());
        Ok(storage)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection scoped to one operation.
    fn connect(&self) -> Result<Connection> {
        debug!("Opening connection to {}", self.path.display());
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|source| Error::DatabaseOpen {
            path: self.path.clone(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Validate and store a new report, returning its tracking id.
    ///
    /// Both status flags start false and `created_at` is now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field is blank after trimming, or
    /// a database error if the insert fails.
    pub fn create_report(
        &self,
        passenger_name: &str,
        item_name: &str,
        description: &str,
    ) -> Result<String> {
        let report = NewReport::new(passenger_name, item_name, description)?;
        let tracking_id = tracking::generate_now();
        self.insert(&report, &tracking_id, Utc::now())?;
        info!(tracking_id = %tracking_id, item = %report.item_name(), "Report created");
        Ok(tracking_id)
    }

    /// Insert a validated report with an explicit id and timestamp.
    pub(crate) fn insert(
        &self,
        report: &NewReport,
        tracking_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r"
            INSERT INTO reports (
                tracking_id, passenger_name, item_name, description, found_status, claim_status, created_at
            )
            VALUES (?1, ?2, ?3, ?4, 0, 0, ?5)
            ",
            params![
                tracking_id,
                report.passenger_name(),
                report.item_name(),
                report.description(),
                created_at.format(CREATED_AT_FORMAT).to_string(),
            ],
        )?;
        debug!("Inserted report {}", tracking_id);
        Ok(())
    }

    /// Get a report by its exact tracking id.
    ///
    /// Callers normalize user input first; see [`tracking::normalize`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Option<Report>> {
        let conn = self.connect()?;
        let result = conn
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE tracking_id = ?1"),
                [tracking_id],
                Self::row_to_report,
            )
            .optional()?;
        Ok(result)
    }

    /// Get every report, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<Report>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC, rowid DESC"
        ))?;

        let reports = stmt
            .query_map([], Self::row_to_report)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    /// Get the most recent reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<Report>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let reports = stmt
            .query_map([limit_i64], Self::row_to_report)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    /// Write the status flags for a report.
    ///
    /// The [`StatusUpdate`] already guarantees claim implies found. An unknown
    /// id is not an error; the return value says whether a row was touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_status(&self, tracking_id: &str, update: StatusUpdate) -> Result<bool> {
        let conn = self.connect()?;
        let affected = conn.execute(
            r"
            UPDATE reports
            SET found_status = ?1, claim_status = ?2
            WHERE tracking_id = ?3
            ",
            params![update.found_status(), update.claim_status(), tracking_id],
        )?;

        if affected == 0 {
            debug!("No report matched {} for status update", tracking_id);
        }
        Ok(affected > 0)
    }

    /// Count reports by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn metrics(&self) -> Result<Metrics> {
        let conn = self.connect()?;
        let (total, found, claimed): (i64, i64, i64) = conn.query_row(
            r"
            SELECT
                COUNT(*),
                COALESCE(SUM(found_status = 1), 0),
                COALESCE(SUM(claim_status = 1), 0)
            FROM reports
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(Metrics::from_counts(total, found, claimed))
    }

    /// Convert a database row to a Report struct.
    fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
        let tracking_id: String = row.get(0)?;
        let created_at_str: String = row.get(6)?;

        let created_at = parse_created_at(&created_at_str).unwrap_or_else(|| {
            warn!(
                "Unparseable created_at {:?} on {}, using now",
                created_at_str, tracking_id
            );
            Utc::now()
        });

        Ok(Report {
            tracking_id,
            passenger_name: row.get(1)?,
            item_name: row.get(2)?,
            description: row.get(3)?,
            found_status: row.get(4)?,
            claim_status: row.get(5)?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_storage() -> (tempfile::TempDir, Storage) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let storage =
            Storage::open(dir.path().join("lost_found.db")).expect("failed to open storage");
        (dir, storage)
    }

    fn insert_at(storage: &Storage, tracking_id: &str, item: &str, hour: u32) {
        let report = NewReport::new("Jane Doe", item, "desc").unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap();
        storage.insert(&report, tracking_id, created_at).unwrap();
    }

    #[test]
    fn test_create_and_find() {
        let (_dir, storage) = create_test_storage();

        let id = storage
            .create_report("Jane Doe", "Backpack", "Blue backpack, gate 12")
            .unwrap();
        assert!(tracking::is_well_formed(&id));

        let report = storage.find_by_tracking_id(&id).unwrap().unwrap();
        assert_eq!(report.tracking_id, id);
        assert_eq!(report.passenger_name, "Jane Doe");
        assert_eq!(report.item_name, "Backpack");
        assert_eq!(report.description, "Blue backpack, gate 12");
        assert!(!report.found_status);
        assert!(!report.claim_status);
    }

    #[test]
    fn test_create_stores_trimmed_fields() {
        let (_dir, storage) = create_test_storage();

        let id = storage
            .create_report("  Jane Doe  ", " Backpack", "Blue ")
            .unwrap();
        let report = storage.find_by_tracking_id(&id).unwrap().unwrap();
        assert_eq!(report.passenger_name, "Jane Doe");
        assert_eq!(report.item_name, "Backpack");
        assert_eq!(report.description, "Blue");
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let (_dir, storage) = create_test_storage();

        let err = storage.create_report("Jane", "  ", "Blue").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(storage.metrics().unwrap().total, 0);
    }

    #[test]
    fn test_find_nonexistent() {
        let (_dir, storage) = create_test_storage();
        assert!(storage
            .find_by_tracking_id("LF-000000-AAAAAA")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_find_is_exact_match() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-ABC123", "Bag", 10);

        assert!(storage
            .find_by_tracking_id("lf-240101-abc123")
            .unwrap()
            .is_none());
        assert!(storage
            .find_by_tracking_id("LF-240101-ABC12")
            .unwrap()
            .is_none());
        assert!(storage
            .find_by_tracking_id("LF-240101-ABC123")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_list_all_newest_first() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-AAAAAA", "first", 8);
        insert_at(&storage, "LF-240101-CCCCCC", "third", 12);
        insert_at(&storage, "LF-240101-BBBBBB", "second", 10);

        let items: Vec<String> = storage
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.item_name)
            .collect();
        assert_eq!(items, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_list_same_second_uses_insertion_order() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-AAAAAA", "older", 9);
        insert_at(&storage, "LF-240101-BBBBBB", "newer", 9);

        let all = storage.list_all().unwrap();
        assert_eq!(all[0].item_name, "newer");
        assert_eq!(all[1].item_name, "older");
    }

    #[test]
    fn test_list_recent_bounded() {
        let (_dir, storage) = create_test_storage();
        for hour in 0..10 {
            insert_at(&storage, &format!("LF-240101-AAAA{hour:02}"), "item", hour);
        }

        let recent = storage.list_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].tracking_id, "LF-240101-AAAA09");
        assert_eq!(recent[2].tracking_id, "LF-240101-AAAA07");

        assert_eq!(storage.list_recent(100).unwrap().len(), 10);
        assert!(storage.list_recent(0).unwrap().is_empty());
    }

    #[test]
    fn test_created_at_round_trips_at_second_precision() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-ABC123", "Bag", 14);

        let report = storage.find_by_tracking_id("LF-240101-ABC123").unwrap().unwrap();
        assert_eq!(
            report.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_update_status() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-ABC123", "Bag", 10);

        assert!(storage
            .update_status("LF-240101-ABC123", StatusUpdate::new(true, false))
            .unwrap());
        let report = storage.find_by_tracking_id("LF-240101-ABC123").unwrap().unwrap();
        assert!(report.found_status);
        assert!(!report.claim_status);

        storage
            .update_status("LF-240101-ABC123", StatusUpdate::new(true, true))
            .unwrap();
        let report = storage.find_by_tracking_id("LF-240101-ABC123").unwrap().unwrap();
        assert!(report.claim_status);
    }

    #[test]
    fn test_update_status_claim_without_found_is_cleared() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-ABC123", "Bag", 10);
        storage
            .update_status("LF-240101-ABC123", StatusUpdate::new(true, true))
            .unwrap();

        storage
            .update_status("LF-240101-ABC123", StatusUpdate::new(false, true))
            .unwrap();
        let report = storage.find_by_tracking_id("LF-240101-ABC123").unwrap().unwrap();
        assert!(!report.found_status);
        assert!(!report.claim_status);
    }

    #[test]
    fn test_update_status_unknown_id_is_noop() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-ABC123", "Bag", 10);

        let touched = storage
            .update_status("LF-999999-ZZZZZZ", StatusUpdate::new(true, true))
            .unwrap();
        assert!(!touched);
        assert_eq!(storage.metrics().unwrap().found, 0);
    }

    #[test]
    fn test_metrics_empty() {
        let (_dir, storage) = create_test_storage();
        assert_eq!(storage.metrics().unwrap(), Metrics::default());
    }

    #[test]
    fn test_metrics_counts() {
        let (_dir, storage) = create_test_storage();
        insert_at(&storage, "LF-240101-AAAAAA", "a", 8);
        insert_at(&storage, "LF-240101-BBBBBB", "b", 9);
        insert_at(&storage, "LF-240101-CCCCCC", "c", 10);
        storage
            .update_status("LF-240101-AAAAAA", StatusUpdate::new(true, false))
            .unwrap();
        storage
            .update_status("LF-240101-BBBBBB", StatusUpdate::new(true, true))
            .unwrap();

        let metrics = storage.metrics().unwrap();
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.found, 2);
        assert_eq!(metrics.claimed, 1);
        assert_eq!(metrics.open_cases, 2);
    }

    #[test]
    fn test_path() {
        let (dir, storage) = create_test_storage();
        assert_eq!(storage.path(), dir.path().join("lost_found.db"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/lost_found.db");

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        assert_eq!(storage.metrics().unwrap().total, 0);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lost_found.db");

        let id = Storage::open(&path)
            .unwrap()
            .create_report("Jane", "Umbrella", "Black")
            .unwrap();

        let reopened = Storage::open(&path).unwrap();
        assert!(reopened.find_by_tracking_id(&id).unwrap().is_some());
    }

    #[test]
    fn test_unicode_content() {
        let (_dir, storage) = create_test_storage();
        let id = storage
            .create_report("Zoë Łukasz", "Паспорт", "旅行証 🌍")
            .unwrap();

        let report = storage.find_by_tracking_id(&id).unwrap().unwrap();
        assert_eq!(report.passenger_name, "Zoë Łukasz");
        assert_eq!(report.description, "旅行証 🌍");
    }
}
