//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── StoreError       - What any store implementation may report       │
//! │  └── TokenError       - Token issuer failures                          │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - SQLite failures, converted into StoreError     │
//! │                                                                         │
//! │  stockroom-service errors                                              │
//! │  └── ServiceError     - What callers see (Validation, Conflict, ...)   │
//! │                                                                         │
//! │  Flow: DbError → StoreError → ServiceError → transport                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any store call, so a failed validation never leaves a
/// partial effect behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is below zero.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is above the supported maximum.
    #[error("{field} cannot exceed {max}")]
    ExceedsMaximum { field: String, max: String },

    /// Invalid format (e.g. malformed money amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::MustBeNonNegative {
            field: field.into(),
        }
    }

    pub fn exceeds(field: impl Into<String>, max: impl ToString) -> Self {
        ValidationError::ExceedsMaximum {
            field: field.into(),
            max: max.to_string(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::ExceedsMaximum { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Errors reported by [`ProductStore`](crate::store::ProductStore) and
/// [`CredentialStore`](crate::store::CredentialStore) implementations.
///
/// ## Mapping
/// ```text
/// NotFound    → the referenced key does not exist
/// Duplicate   → a unique key (id, name, username) is already taken
/// Unavailable → backend failure (pool closed, I/O, SQL error)
/// Corrupt     → a stored record no longer satisfies domain invariants
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Token Error
// =============================================================================

/// Token issuer failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No signing secret was configured.
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
