//! # Service Error Type
//!
//! Unified error type for the inventory and auth services.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  ValidationError (core) ───────────────────┐                           │
//! │                                            │                           │
//! │  StoreError (core) ◄── DbError (db)        │                           │
//! │       │                                    ▼                           │
//! │       └──── from_store(entity, e) ───► ServiceError ──► code()         │
//! │                                            ▲                 │         │
//! │  TokenError (core) ────────────────────────┘                 ▼         │
//! │                                                        ErrorResponse   │
//! │                                                  { code, message }     │
//! │                                                                         │
//! │  A transport maps ErrorCode to its own status space:                   │
//! │    VALIDATION_ERROR → 400    NOT_FOUND → 404    CONFLICT → 409         │
//! │    AUTHENTICATION_FAILED → 401                  INFRASTRUCTURE → 500   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use stockroom_core::{StoreError, TokenError, ValidationError};

/// Errors returned by service operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Malformed input. Always raised before any store mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Duplicate product name or username.
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: String,
        field: String,
        value: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unknown user or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    Authentication,

    /// Store or token issuer failure.
    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

/// Machine-readable error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Conflict,
    NotFound,
    AuthenticationFailed,
    Infrastructure,
}

impl ServiceError {
    pub fn conflict(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ServiceError::Conflict {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Lifts a store failure, naming the entity a duplicate belongs to.
    ///
    /// ## Mapping
    /// ```text
    /// StoreError::NotFound     → ServiceError::NotFound
    /// StoreError::Duplicate    → ServiceError::Conflict { entity, .. }
    /// StoreError::Unavailable  → ServiceError::Infrastructure
    /// StoreError::Corrupt      → ServiceError::Infrastructure
    /// ```
    pub fn from_store(entity: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            StoreError::Duplicate { field, value } => ServiceError::conflict(entity, field, value),
            StoreError::Unavailable(msg) | StoreError::Corrupt(msg) => {
                error!(entity, error = %msg, "Store failure");
                ServiceError::Infrastructure(msg)
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Validation(_) => ErrorCode::ValidationError,
            ServiceError::Conflict { .. } => ErrorCode::Conflict,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::Authentication => ErrorCode::AuthenticationFailed,
            ServiceError::Infrastructure(_) => ErrorCode::Infrastructure,
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        error!(error = %err, "Token issuance failed");
        ServiceError::Infrastructure(err.to_string())
    }
}

/// Serializable error body for transports.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Product not found: 9c1e..." }
/// ```
///
/// Infrastructure details stay in the logs; the body carries a generic
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        let message = match err {
            ServiceError::Infrastructure(_) => "Internal error".to_string(),
            other => other.to_string(),
        };
        ErrorResponse {
            code: err.code(),
            message,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
