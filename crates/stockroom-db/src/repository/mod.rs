//! # Repository Module
//!
//! SQLite implementations of the store contracts from `stockroom-core`.
//!
//! ```text
//! InventoryService                AuthService
//!       │                              │
//!       │ dyn ProductStore             │ dyn CredentialStore
//!       ▼                              ▼
//! SqliteProductStore            SqliteCredentialStore
//!       │                              │
//!       └──────────── SqlitePool ──────┘
//!                         │
//!                  products / users
//! ```
//!
//! Each store also exposes inherent methods returning [`DbResult`] for
//! callers that want the database error detail.
//!
//! [`DbResult`]: crate::error::DbResult

pub mod credential;
pub mod product;
