//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! This crate holds the catalog and credential domain with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Transport (external: HTTP, CLI, ...)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   stockroom-service: InventoryService, AuthService, JwtIssuer   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   query   │  │   store   │  │   │
//! │  │   │  Product  │  │   Money   │  │  Filter   │  │  traits   │  │   │
//! │  │   │Credential │  │           │  │  Sort     │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │           stockroom-db: memory + SQLite store impls             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Credential, ClaimSet)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//! - [`query`] - Filter / sort / paginate engine
//! - [`store`] - Store and token issuer contracts
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::{Money, Product};
//!
//! let widget = Product::new("p-1", "Widget", "9.99".parse().unwrap(), 3).unwrap();
//! assert_eq!(widget.stock_value(), Money::from_cents(2997));
//!
//! let cheaper = widget.with_price(Money::from_cents(899)).unwrap();
//! assert_eq!(cheaper.name(), widget.name());
//! ```

pub mod error;
pub mod money;
pub mod query;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{StoreError, StoreResult, TokenError, ValidationError};
pub use money::Money;
pub use query::{Page, PageRequest, ProductFilter, ProductSort, SortField};
pub use store::{CredentialStore, ProductStore, TokenIssuer};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity at or below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Page size used when a caller asks for a page size below 1.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
