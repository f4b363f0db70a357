//! Signed cookie sessions.
//!
//! The whole session lives client-side in one cookie: the JSON payload is
//! hex-encoded and followed by a keyed BLAKE3 MAC over it. A cookie whose
//! MAC does not verify is discarded and the request proceeds anonymously.
//!
//! Besides the admin flag the session carries pending flash notifications,
//! which are shown once on the next rendered page and then dropped.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "lostfound_session";

/// Most notifications a session holds; older ones are dropped first.
pub const MAX_PENDING_FLASHES: usize = 5;

/// BLAKE3 key-derivation context for the cookie MAC key.
const KEY_CONTEXT: &str = "lostfound 2024-01-01 session cookie mac";

/// Severity of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    /// Operation went through.
    Success,
    /// Something the user needs to fix or know about.
    Error,
}

impl FlashLevel {
    /// CSS class name used when rendering.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A one-shot notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// Severity.
    pub level: FlashLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Flash {
    /// A success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    /// An error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Per-browser session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    admin_authenticated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<Flash>,
}

impl Session {
    /// Whether the admin password has been accepted in this session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin_authenticated
    }

    /// Mark the session as authenticated.
    pub fn log_in(&mut self) {
        self.admin_authenticated = true;
    }

    /// Drop the admin flag.
    pub fn log_out(&mut self) {
        self.admin_authenticated = false;
    }

    /// Queue a notification for the next rendered page.
    ///
    /// The queue is capped at [`MAX_PENDING_FLASHES`] so the cookie stays
    /// small when redirects are never followed.
    pub fn push_flash(&mut self, flash: Flash) {
        if self.flashes.len() >= MAX_PENDING_FLASHES {
            let excess = self.flashes.len() + 1 - MAX_PENDING_FLASHES;
            self.flashes.drain(..excess);
        }
        self.flashes.push(flash);
    }

    /// Remove and return all queued notifications.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}

/// MAC key derived from the configured session secret.
#[derive(Clone)]
pub struct SessionKey {
    key: [u8; 32],
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey").finish_non_exhaustive()
    }
}

impl SessionKey {
    /// Derive the MAC key from a secret string.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
        }
    }

    /// Serialize and sign a session into a cookie value.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized.
    pub fn encode(&self, session: &Session) -> Result<String> {
        let payload = hex::encode(serde_json::to_vec(session)?);
        let mac = blake3::keyed_hash(&self.key, payload.as_bytes());
        Ok(format!("{payload}.{}", mac.to_hex()))
    }

    /// Verify and deserialize a cookie value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Session`] if the value is malformed or the MAC does
    /// not match.
    pub fn decode(&self, value: &str) -> Result<Session> {
        let (payload, mac_hex) = value
            .split_once('.')
            .ok_or_else(|| Error::session("missing signature"))?;

        let mac_bytes: [u8; 32] = hex::decode(mac_hex)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| Error::session("malformed signature"))?;

        // blake3::Hash equality is constant time.
        let expected = blake3::keyed_hash(&self.key, payload.as_bytes());
        if blake3::Hash::from(mac_bytes) != expected {
            return Err(Error::session("signature mismatch"));
        }

        let json = hex::decode(payload).map_err(|e| Error::session(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Decode the cookie if present, falling back to an empty session.
    #[must_use]
    pub fn decode_or_default(&self, value: Option<&str>) -> Session {
        match value {
            None => Session::default(),
            Some(value) => self.decode(value).unwrap_or_else(|err| {
                warn!("Discarding session cookie: {}", err);
                Session::default()
            }),
        }
    }
}

/// Find a cookie by name in a `Cookie` request header value.
#[must_use]
pub fn find_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// `Set-Cookie` header value carrying an encoded session.
#[must_use]
pub fn set_cookie_header(value: &str) -> String {
    format!("{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax")
}
