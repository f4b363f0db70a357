//! Error types for lostfound.
//!
//! This module defines all error types used throughout the lostfound crate.
//! The four workflow kinds (validation, not found, auth required, auth failed)
//! are recovered by the web layer and shown to the user as flash notifications;
//! everything else is an infrastructure failure.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lostfound operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Workflow Errors ===
    /// A required field was missing or blank.
    #[error("validation failed: {message}")]
    Validation {
        /// Which input was rejected.
        message: String,
    },

    /// No report exists for the tracking id.
    #[error("tracking id not found: {tracking_id}")]
    NotFound {
        /// The normalized tracking id that was looked up.
        tracking_id: String,
    },

    /// An admin route was hit without an authenticated session.
    #[error("admin authentication required")]
    AuthRequired,

    /// The submitted admin password did not match.
    #[error("invalid admin password")]
    AuthFailed,

    // === Session Errors ===
    /// The session cookie could not be decoded or its signature did not verify.
    #[error("invalid session cookie: {0}")]
    Session(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for lostfound operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for a tracking id.
    #[must_use]
    pub fn not_found(tracking_id: impl Into<String>) -> Self {
        Self::NotFound {
            tracking_id: tracking_id.into(),
        }
    }

    /// Create a new session error.
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is one of the workflow kinds that the user should
    /// see as a notification rather than a failure page.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NotFound { .. } | Self::AuthRequired | Self::AuthFailed
        )
    }
}
