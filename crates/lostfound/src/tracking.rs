//! Tracking id generation and normalization.
//!
//! Ids look like `LF-240101-3FA85C`: the UTC submission date followed by six
//! hex digits taken from a random v4 UUID. Uniqueness is probabilistic only.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use uuid::Uuid;

/// Prefix shared by every tracking id.
pub const PREFIX: &str = "LF";

/// Number of random characters in the suffix.
pub const TOKEN_LEN: usize = 6;

static TRACKING_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LF-\d{6}-[A-Z0-9]{6}$").expect("Invalid regex pattern"));

/// Build a tracking id from a date and a random token.
#[must_use]
pub fn generate(now: DateTime<Utc>, token: Uuid) -> String {
    let hex = token.simple().to_string();
    format!(
        "{PREFIX}-{}-{}",
        now.format("%y%m%d"),
        hex[..TOKEN_LEN].to_ascii_uppercase()
    )
}

/// Build a tracking id for right now with a fresh random token.
#[must_use]
pub fn generate_now() -> String {
    generate(Utc::now(), Uuid::new_v4())
}

/// Trim and uppercase user input before lookup.
#[must_use]
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Whether `id` has the `LF-YYMMDD-XXXXXX` shape.
#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    TRACKING_ID_PATTERN.is_match(id)
}
