//! # Collaborator Contracts
//!
//! Traits the services depend on. Concrete implementations live in
//! `stockroom-db` (stores) and `stockroom-service` (token issuer) and are
//! injected at composition time as `Arc<dyn ...>`.
//!
//! ```text
//! InventoryService ──► dyn ProductStore    ◄── MemoryProductStore
//!                                          ◄── SqliteProductStore
//!
//! AuthService ───────► dyn CredentialStore ◄── MemoryCredentialStore
//!             │                            ◄── SqliteCredentialStore
//!             └──────► dyn TokenIssuer     ◄── JwtIssuer
//! ```
//!
//! Every store method is a single atomic operation at the store boundary.
//! Nothing here spans calls.

use async_trait::async_trait;
use chrono::Duration;

use crate::error::{StoreResult, TokenError};
use crate::money::Money;
use crate::query::{ProductFilter, ProductSort};
use crate::types::{ClaimSet, Credential, Product};

/// Persistence contract for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a product. Fails with `Duplicate` when the id or the
    /// case-insensitive name is already taken.
    async fn add(&self, product: &Product) -> StoreResult<Product>;

    /// Fails with `NotFound` when absent.
    async fn get(&self, id: &str) -> StoreResult<Product>;

    async fn find_by_name_case_insensitive(&self, name: &str) -> StoreResult<Option<Product>>;

    /// Every product, in insertion order.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Filtered, sorted window plus the total number of matches.
    async fn query(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        skip: u64,
        take: u64,
    ) -> StoreResult<(Vec<Product>, u64)>;

    /// Replaces the product with the same id. Fails with `NotFound` when
    /// absent.
    async fn update(&self, product: &Product) -> StoreResult<Product>;

    /// Fails with `NotFound` when absent.
    async fn remove(&self, id: &str) -> StoreResult<()>;

    /// Σ price × quantity; zero when empty.
    async fn sum_price_times_quantity(&self) -> StoreResult<Money>;

    /// Highest price, smallest id on ties.
    async fn max_by_price(&self) -> StoreResult<Option<Product>>;

    async fn count(&self) -> StoreResult<u64>;
}

/// Persistence contract for user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive username lookup.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Credential>>;

    /// Fails with `Duplicate` when the username (or id) is taken.
    async fn insert(&self, credential: &Credential) -> StoreResult<Credential>;
}

/// Signs a claim set into an opaque bearer token.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &ClaimSet, valid_for: Duration) -> Result<String, TokenError>;
}
