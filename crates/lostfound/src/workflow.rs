//! Public and admin workflows.
//!
//! [`Desk`] holds the operations behind every page, independent of HTTP.
//! The four user-facing error kinds are turned into [`Flash`] notifications
//! here; only infrastructure errors escape to the caller.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::report::{Metrics, Report, StatusUpdate};
use crate::session::{Flash, Session};
use crate::storage::Storage;
use crate::tracking;

/// Shown after a report is stored.
pub const MSG_REPORT_SUBMITTED: &str = "Report submitted successfully.";
/// Shown when a submission has a blank field.
pub const MSG_REPORT_INCOMPLETE: &str = "Please complete all report fields.";
/// Shown when the track form is submitted empty.
pub const MSG_TRACKING_ID_MISSING: &str = "Enter a Tracking ID to search.";
/// Shown when no report matches the tracking id.
pub const MSG_TRACKING_ID_NOT_FOUND: &str = "Tracking ID not found. Please verify and try again.";
/// Shown after a wrong admin password.
pub const MSG_INVALID_PASSWORD: &str = "Invalid admin password.";

/// What the visitor asked the public page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicAction {
    /// Plain page view, or an unrecognised action tag.
    View,
    /// Submit a new report.
    Report {
        /// Passenger name as typed.
        passenger_name: String,
        /// Item name as typed.
        item_name: String,
        /// Description as typed.
        description: String,
    },
    /// Look up a report.
    Track {
        /// Tracking id as typed.
        tracking_id: String,
    },
}

/// Everything the public page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicPage {
    /// Aggregate counters.
    pub metrics: Metrics,
    /// Most recent reports, newest first.
    pub recent: Vec<Report>,
    /// Lookup result for a successful track.
    pub search_result: Option<Report>,
    /// Tracking id of a report created by this request.
    pub latest_tracking_id: Option<String>,
    /// Notifications raised by this request.
    pub flashes: Vec<Flash>,
}

/// Everything the admin dashboard renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Aggregate counters.
    pub metrics: Metrics,
    /// Every report, newest first.
    pub reports: Vec<Report>,
}

/// The lost-and-found desk: storage plus the settings the workflows need.
#[derive(Debug, Clone)]
pub struct Desk {
    storage: Storage,
    admin_password_hash: blake3::Hash,
    recent_limit: usize,
}

impl Desk {
    /// Create a desk over `storage`.
    #[must_use]
    pub fn new(storage: Storage, admin_password: &str, recent_limit: usize) -> Self {
        Self {
            storage,
            admin_password_hash: blake3::hash(admin_password.as_bytes()),
            recent_limit,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Store a report and return its tracking id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank fields, or a storage error.
    pub fn submit(&self, passenger_name: &str, item_name: &str, description: &str) -> Result<String> {
        self.storage
            .create_report(passenger_name, item_name, description)
    }

    /// Look up a report from user input.
    ///
    /// Input is trimmed and uppercased; malformed ids are reported as not
    /// found without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty input, [`Error::NotFound`] for
    /// an unknown id, or a storage error.
    pub fn track(&self, raw_tracking_id: &str) -> Result<Report> {
        let tracking_id = tracking::normalize(raw_tracking_id);
        if tracking_id.is_empty() {
            return Err(Error::validation("tracking_id is required"));
        }
        if !tracking::is_well_formed(&tracking_id) {
            return Err(Error::not_found(tracking_id));
        }
        self.storage
            .find_by_tracking_id(&tracking_id)?
            .ok_or_else(|| Error::not_found(tracking_id))
    }

    /// Run a public-page action and gather everything the page shows.
    ///
    /// # Errors
    ///
    /// Returns an error only for storage failures.
    pub fn public_page(&self, action: PublicAction) -> Result<PublicPage> {
        let mut flashes = Vec::new();
        let mut search_result = None;
        let mut latest_tracking_id = None;

        match action {
            PublicAction::View => {}
            PublicAction::Report {
                passenger_name,
                item_name,
                description,
            } => match self.submit(&passenger_name, &item_name, &description) {
                Ok(tracking_id) => {
                    latest_tracking_id = Some(tracking_id);
                    flashes.push(Flash::success(MSG_REPORT_SUBMITTED));
                }
                Err(Error::Validation { .. }) => flashes.push(Flash::error(MSG_REPORT_INCOMPLETE)),
                Err(err) => return Err(err),
            },
            PublicAction::Track { tracking_id } => match self.track(&tracking_id) {
                Ok(report) => search_result = Some(report),
                Err(Error::Validation { .. }) => flashes.push(Flash::error(MSG_TRACKING_ID_MISSING)),
                Err(Error::NotFound { .. }) => flashes.push(Flash::error(MSG_TRACKING_ID_NOT_FOUND)),
                Err(err) => return Err(err),
            },
        }

        Ok(PublicPage {
            metrics: self.storage.metrics()?,
            recent: self.storage.list_recent(self.recent_limit)?,
            search_result,
            latest_tracking_id,
            flashes,
        })
    }

    /// Check a submitted admin password and log the session in on a match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthFailed`] on a mismatch; the session is unchanged.
    pub fn log_in(&self, session: &mut Session, password: &str) -> Result<()> {
        // Comparing digests keeps the check constant time.
        if blake3::hash(password.as_bytes()) == self.admin_password_hash {
            session.log_in();
            info!("Admin logged in");
            Ok(())
        } else {
            warn!("Rejected admin login attempt");
            Err(Error::AuthFailed)
        }
    }

    /// Gate for admin-only operations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthRequired`] for an anonymous session.
    pub fn require_admin(session: &Session) -> Result<()> {
        if session.is_admin() {
            Ok(())
        } else {
            Err(Error::AuthRequired)
        }
    }

    /// Load the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthRequired`] for an anonymous session, or a storage error.
    pub fn dashboard(&self, session: &Session) -> Result<Dashboard> {
        Self::require_admin(session)?;
        Ok(Dashboard {
            metrics: self.storage.metrics()?,
            reports: self.storage.list_all()?,
        })
    }

    /// Apply an admin status update and describe the result.
    ///
    /// Unknown ids leave the store untouched and produce an error notification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthRequired`] for an anonymous session, or a storage error.
    pub fn update_status(
        &self,
        session: &Session,
        tracking_id: &str,
        update: StatusUpdate,
    ) -> Result<Flash> {
        Self::require_admin(session)?;

        if self.storage.update_status(tracking_id, update)? {
            info!(
                tracking_id = %tracking_id,
                found = update.found_status(),
                claimed = update.claim_status(),
                "Report status updated"
            );
            Ok(Flash::success(format!("Updated workflow for {tracking_id}.")))
        } else {
            warn!(tracking_id = %tracking_id, "Status update for unknown report");
            Ok(Flash::error(format!(
                "No report found for {tracking_id}; nothing was updated."
            )))
        }
    }
}
