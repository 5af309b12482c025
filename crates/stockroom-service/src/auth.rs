//! # Auth Service
//!
//! Registration and login over an injected [`CredentialStore`] and
//! [`TokenIssuer`].
//!
//! ## Flows
//! ```text
//! register                                login
//! ────────                                ─────
//! validate username / password            find_by_username
//!        │                                       │ (absent: dummy hash)
//! find_by_username ── taken ──► Conflict         ▼
//!        │                                verify (spawn_blocking)
//!        ▼                                       ├── absent or ──────┐
//! hash (spawn_blocking, argon2id)                │   mismatch        │
//!        │                                       ▼                   ▼
//! insert ── duplicate ──► Conflict        issue token (2h)    Authentication
//!        │                                       │            "Invalid
//!        ▼                                       ▼             credentials"
//! RegisteredUser { id, username, role }   AuthResponse
//! ```
//!
//! The service keeps no session state. Role checks belong to whatever
//! transport consumes the token.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use stockroom_core::validation::{validate_password, validate_username};
use stockroom_core::{
    generate_id, ClaimSet, Credential, CredentialStore, StoreError, TokenIssuer,
};

use crate::error::{ServiceError, ServiceResult};
use crate::password::{PasswordHasher, UNMATCHABLE_HASH};

const ENTITY: &str = "User";

/// Token lifetime unless overridden with [`AuthService::with_token_lifetime`].
pub const TOKEN_VALIDITY_SECS: i64 = 2 * 60 * 60;

fn store_err(err: StoreError) -> ServiceError {
    ServiceError::from_store(ENTITY, err)
}

/// Hash a login attempt is verified against. Unknown users still pay for
/// one full verification.
fn verification_hash(credential: Option<&Credential>) -> &str {
    credential.map_or(UNMATCHABLE_HASH, Credential::password_hash)
}

// =============================================================================
// Request / Response Shapes
// =============================================================================

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    /// Blank or absent registers a `"User"`.
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A freshly registered user. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<&Credential> for RegisteredUser {
    fn from(c: &Credential) -> Self {
        RegisteredUser {
            id: c.id().to_string(),
            username: c.username().to_string(),
            role: c.role().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenIssuer>,
    hasher: PasswordHasher,
    token_lifetime: Duration,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, tokens: Arc<dyn TokenIssuer>) -> Self {
        AuthService {
            credentials,
            tokens,
            hasher: PasswordHasher::new(),
            token_lifetime: Duration::seconds(TOKEN_VALIDITY_SECS),
        }
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Creates a credential for a new username.
    pub async fn register(&self, request: &RegisterRequest) -> ServiceResult<RegisteredUser> {
        let username = validate_username(&request.username)?;
        validate_password(&request.password)?;

        if self
            .credentials
            .find_by_username(&username)
            .await
            .map_err(store_err)?
            .is_some()
        {
            warn!(username = %username, "Username already registered");
            return Err(ServiceError::conflict(ENTITY, "username", username));
        }

        let hasher = self.hasher;
        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Infrastructure(format!("Hashing task failed: {e}")))??;

        let credential = Credential::new(
            generate_id(),
            &username,
            password_hash,
            request.role.as_deref(),
        )?;
        let stored = self
            .credentials
            .insert(&credential)
            .await
            .map_err(store_err)?;

        info!(id = %stored.id(), username = %stored.username(), role = %stored.role(), "User registered");
        Ok(RegisteredUser::from(&stored))
    }

    /// Verifies a password and issues a token.
    ///
    /// Unknown users and wrong passwords fail with the same
    /// [`ServiceError::Authentication`].
    pub async fn login(&self, request: &LoginRequest) -> ServiceResult<AuthResponse> {
        let username = request.username.trim();

        let credential = self
            .credentials
            .find_by_username(username)
            .await
            .map_err(store_err)?;

        let hasher = self.hasher;
        let password = request.password.clone();
        let hash = verification_hash(credential.as_ref()).to_string();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ServiceError::Infrastructure(format!("Verification task failed: {e}")))?;

        let Some(credential) = credential.filter(|_| verified) else {
            warn!(username = %username, "Login rejected");
            return Err(ServiceError::Authentication);
        };

        let token = self
            .tokens
            .issue(&ClaimSet::for_credential(&credential), self.token_lifetime)?;

        info!(id = %credential.id(), username = %credential.username(), "Login succeeded");
        Ok(AuthResponse {
            token,
            username: credential.username().to_string(),
            role: credential.role().to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
