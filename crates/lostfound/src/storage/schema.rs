//! `SQLite` schema definitions for lostfound.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the reports table.
pub const CREATE_REPORTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS reports (
    tracking_id TEXT PRIMARY KEY,
    passenger_name TEXT NOT NULL,
    item_name TEXT NOT NULL,
    description TEXT NOT NULL,
    found_status INTEGER NOT NULL DEFAULT 0,
    claim_status INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_at` for recency listing.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reports_created_at ON reports(created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_REPORTS_TABLE,
    CREATE_CREATED_AT_INDEX,
    CREATE_METADATA_TABLE,
];

/// Columns selected whenever a full [`crate::Report`] is read.
pub const REPORT_COLUMNS: &str =
    "tracking_id, passenger_name, item_name, description, found_status, claim_status, created_at";
