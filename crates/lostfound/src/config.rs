//! Configuration management for lostfound.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "lostfound";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "lost_found.db";

/// Placeholder printed instead of secrets.
const REDACTED: &str = "********";

/// Environment variables for secrets, re-read verbatim after the prefixed
/// provider so `123456` stays a string. Later entries win, which puts the
/// unprefixed legacy names above their `LOSTFOUND_` spellings.
const SECRET_ENV_KEYS: &[(&str, &str)] = &[
    ("LOSTFOUND_AUTH__SECRET_KEY", "auth.secret_key"),
    ("LOSTFOUND_AUTH__ADMIN_PASSWORD", "auth.admin_password"),
    ("APP_SECRET_KEY", "auth.secret_key"),
    ("LOST_FOUND_ADMIN_PASSWORD", "auth.admin_password"),
];

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `APP_SECRET_KEY` / `LOST_FOUND_ADMIN_PASSWORD`
/// 2. Environment variables prefixed with `LOSTFOUND_` (`LOSTFOUND_AUTH__ADMIN_PASSWORD`)
/// 3. TOML config file at `~/.config/lostfound/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Admin credential and session signing.
    pub auth: AuthConfig,
    /// Public page presentation.
    pub display: DisplayConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub bind_addr: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/lostfound/lost_found.db`
    pub database_path: Option<PathBuf>,
}

/// Admin credential and session signing secret.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret used to sign the session cookie.
    pub secret_key: String,
    /// The single shared admin password.
    pub admin_password: String,
}

/// Presentation settings for the public page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How many recent reports the public page lists.
    pub recent_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: "change-this-secret-key".to_string(),
            admin_password: "airport-admin".to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &REDACTED)
            .field("admin_password", &REDACTED)
            .finish()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { recent_limit: 8 }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("LOSTFOUND_").split("__"));

        // Figment parses env values; a string merge on the same key replaces them.
        for (var, key) in SECRET_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge((*key, value));
            }
        }

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid bind_addr: {}", self.server.bind_addr),
            });
        }

        if self.auth.secret_key.is_empty() {
            return Err(Error::ConfigValidation {
                message: "secret_key must not be empty".to_string(),
            });
        }

        if self.auth.admin_password.is_empty() {
            return Err(Error::ConfigValidation {
                message: "admin_password must not be empty".to_string(),
            });
        }

        if self.display.recent_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_limit must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the bind address as a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid bind_addr: {}", self.server.bind_addr),
            })
    }

    /// A copy safe to print: secrets are replaced with a placeholder.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.auth.secret_key = REDACTED.to_string();
        copy.auth.admin_password = REDACTED.to_string();
        copy
    }
}
