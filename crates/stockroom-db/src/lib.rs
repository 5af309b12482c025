//! # stockroom-db: Store Implementations for Stockroom
//!
//! Two implementations of each store contract from `stockroom-core`:
//! process-local stores for tests and demos, and SQLite stores through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  InventoryService / AuthService (stockroom-service)                    │
//! │       │                                                                 │
//! │       │ Arc<dyn ProductStore>, Arc<dyn CredentialStore>                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌────────────────┐  ┌──────────────────┐  │   │
//! │  │   │    memory     │  │   repository   │  │ pool/migrations  │  │   │
//! │  │   │               │  │                │  │                  │  │   │
//! │  │   │ MemoryProduct │  │ SqliteProduct  │◄─│ Database         │  │   │
//! │  │   │ MemoryCred.   │  │ SqliteCred.    │  │ 001_initial.sql  │  │   │
//! │  │   └───────────────┘  └────────────────┘  └──────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./stockroom.db")).await?;
//! let products = db.products();
//! println!("{} products", products.count_all().await?);
//! ```

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use memory::{MemoryCredentialStore, MemoryProductStore};
pub use pool::{Database, DbConfig};
pub use repository::credential::SqliteCredentialStore;
pub use repository::product::SqliteProductStore;
