//! # stockroom-service: Application Services for Stockroom
//!
//! The catalog and authentication services, plus the pieces they need at
//! runtime: argon2id password hashing, HS256 token issuance, environment
//! configuration and tracing setup.
//!
//! ## Module Organization
//!
//! - [`inventory`] - `InventoryService` and `QueryParams`
//! - [`auth`] - `AuthService`, request and response shapes
//! - [`password`] - argon2id `PasswordHasher`
//! - [`token`] - `JwtIssuer`
//! - [`config`] - `ServiceConfig::load()` from environment
//! - [`error`] - `ServiceError`, `ErrorCode`, `ErrorResponse`
//! - [`telemetry`] - `init_tracing()`
//! - [`app`] - `Stockroom`, the wired-up pair of services
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_service::{telemetry, ServiceConfig, Stockroom};
//!
//! telemetry::init_tracing();
//! let config = ServiceConfig::load()?;
//! let app = Stockroom::open(&config).await?;
//!
//! let page = app.inventory.query(&QueryParams::default()).await?;
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod inventory;
pub mod password;
pub mod telemetry;
pub mod token;

// =============================================================================
// Re-exports
// =============================================================================

pub use app::Stockroom;
pub use auth::{AuthResponse, AuthService, LoginRequest, RegisterRequest, RegisteredUser};
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorCode, ErrorResponse, ServiceError, ServiceResult};
pub use inventory::{InventoryService, QueryParams};
pub use password::PasswordHasher;
pub use token::{JwtClaims, JwtIssuer};
