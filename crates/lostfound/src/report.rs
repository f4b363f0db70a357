//! Core report types for lostfound.
//!
//! A [`Report`] is the single record the desk keeps per lost item. Only the two
//! status flags ever change after creation, and only through a [`StatusUpdate`],
//! which is what keeps the claim-implies-found invariant in one place.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Storage format for `created_at`; sorts lexicographically in time order.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a report sits in the desk's pipeline.
///
/// Derived from the status flags, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Reported by the passenger, not yet located.
    Reported = 1,
    /// Staff have physically located the item.
    Found = 2,
    /// The item has been handed back to its owner.
    Claimed = 3,
}

impl WorkflowStage {
    /// Compute the stage from the two status flags.
    #[must_use]
    pub fn from_flags(found_status: bool, claim_status: bool) -> Self {
        if claim_status {
            Self::Claimed
        } else if found_status {
            Self::Found
        } else {
            Self::Reported
        }
    }

    /// The 1-3 step number shown in the pipeline.
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Reported => "Reported",
            Self::Found => "Found",
            Self::Claimed => "Claimed",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored lost-item report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Public identifier, `LF-YYMMDD-XXXXXX`.
    pub tracking_id: String,

    /// Who reported the item.
    pub passenger_name: String,

    /// Short item name.
    pub item_name: String,

    /// Free-text description.
    pub description: String,

    /// Staff have located the item.
    pub found_status: bool,

    /// The item was returned to its owner. Implies `found_status`.
    pub claim_status: bool,

    /// When the report was submitted (UTC, second precision).
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// The derived pipeline stage.
    #[must_use]
    pub fn stage(&self) -> WorkflowStage {
        WorkflowStage::from_flags(self.found_status, self.claim_status)
    }

    /// `created_at` in the storage format.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}

/// Validated input for a new report.
///
/// Fields are trimmed; construction fails if any of them ends up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    passenger_name: String,
    item_name: String,
    description: String,
}

impl NewReport {
    /// Validate and trim the three required fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first blank field.
    pub fn new(passenger_name: &str, item_name: &str, description: &str) -> Result<Self> {
        Ok(Self {
            passenger_name: required("passenger_name", passenger_name)?,
            item_name: required("item_name", item_name)?,
            description: required("description", description)?,
        })
    }

    /// Trimmed passenger name.
    #[must_use]
    pub fn passenger_name(&self) -> &str {
        &self.passenger_name
    }

    /// Trimmed item name.
    #[must_use]
    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    /// Trimmed description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// The pair of flags an admin update writes.
///
/// Constructing one always enforces claim-implies-found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusUpdate {
    found_status: bool,
    claim_status: bool,
}

impl StatusUpdate {
    /// Build an update; `claim_status` is cleared when `found_status` is false.
    #[must_use]
    pub fn new(found_status: bool, claim_status: bool) -> Self {
        Self {
            found_status,
            claim_status: found_status && claim_status,
        }
    }

    /// Build an update from raw form values; only `"1"` counts as set.
    #[must_use]
    pub fn from_form(found_status: Option<&str>, claim_status: Option<&str>) -> Self {
        Self::new(found_status == Some("1"), claim_status == Some("1"))
    }

    /// The found flag to store.
    #[must_use]
    pub fn found_status(self) -> bool {
        self.found_status
    }

    /// The claim flag to store.
    #[must_use]
    pub fn claim_status(self) -> bool {
        self.claim_status
    }
}

/// Aggregate counters shown on both the public page and the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// All reports.
    pub total: i64,
    /// Reports with `found_status`.
    pub found: i64,
    /// Reports not yet claimed.
    pub open_cases: i64,
    /// Reports with `claim_status`.
    pub claimed: i64,
}

impl Metrics {
    /// Build metrics from raw counts; `open_cases` is floored at zero.
    #[must_use]
    pub fn from_counts(total: i64, found: i64, claimed: i64) -> Self {
        Self {
            total,
            found,
            open_cases: (total - claimed).max(0),
            claimed,
        }
    }
}

/// Parse a stored `created_at` value.
///
/// Accepts the storage format and RFC 3339.
#[must_use]
pub fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}
