//! Service configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                        | Default           |
//! |---------------------------------|-------------------|
//! | `STOCKROOM_DB_PATH`             | `./stockroom.db`  |
//! | `STOCKROOM_JWT_SECRET`          | unset             |
//! | `STOCKROOM_JWT_ISSUER`          | `stockroom`       |
//! | `STOCKROOM_TOKEN_LIFETIME_SECS` | `7200` (2 hours)  |

use chrono::Duration;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "./stockroom.db";
pub const DEFAULT_ISSUER: &str = "stockroom";
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 7200;

/// Service configuration.
#[derive(Clone)]
pub struct ServiceConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// HMAC key for signing tokens. Without it, logins fail with an
    /// infrastructure error.
    pub jwt_secret: Option<String>,

    /// Token issuer, also used as the audience
    pub jwt_issuer: String,

    /// Token lifetime in seconds
    pub token_lifetime_secs: i64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_lifetime_secs = match lookup("STOCKROOM_TOKEN_LIFETIME_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue("STOCKROOM_TOKEN_LIFETIME_SECS".to_string())
                })?,
            None => DEFAULT_TOKEN_LIFETIME_SECS,
        };

        let jwt_issuer = lookup("STOCKROOM_JWT_ISSUER")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        if jwt_issuer.is_empty() {
            return Err(ConfigError::InvalidValue("STOCKROOM_JWT_ISSUER".to_string()));
        }

        Ok(ServiceConfig {
            db_path: lookup("STOCKROOM_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),

            jwt_secret: lookup("STOCKROOM_JWT_SECRET").filter(|s| !s.is_empty()),

            jwt_issuer,

            token_lifetime_secs,
        })
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::seconds(self.token_lifetime_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            jwt_secret: None,
            jwt_issuer: DEFAULT_ISSUER.to_string(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("db_path", &self.db_path)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .finish()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
