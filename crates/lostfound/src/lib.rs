//! `lostfound` - An airport lost-and-found desk
//!
//! This library provides the record store, tracking ID generation, the
//! public and admin workflows, and the HTTP surface that serves them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod session;
pub mod storage;
pub mod tracking;
pub mod web;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use report::{Metrics, Report, StatusUpdate, WorkflowStage};
pub use session::{Session, SessionKey};
pub use storage::Storage;
pub use web::{build_router, AppState};
pub use workflow::Desk;
