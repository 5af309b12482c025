//! # In-Memory Stores
//!
//! Process-local implementations of the store contracts. Used by tests and
//! by hosts that do not need persistence.
//!
//! Every operation takes the lock once, so each call is atomic on its own.
//! Uniqueness is re-checked under the write lock, so two concurrent `add`s
//! of the same name cannot both succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use stockroom_core::query::{self, ProductFilter, ProductSort};
use stockroom_core::{
    Credential, CredentialStore, Money, Product, ProductStore, StoreError, StoreResult,
};

// =============================================================================
// Products
// =============================================================================

/// Product store backed by a `Vec` kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        MemoryProductStore::default()
    }

    /// Store pre-filled with `products`. Fails on the first duplicate.
    pub async fn with_products(products: Vec<Product>) -> StoreResult<Self> {
        let store = MemoryProductStore::new();
        for product in &products {
            store.add(product).await?;
        }
        Ok(store)
    }
}

fn check_unique(existing: &[Product], candidate: &Product, skip_id: Option<&str>) -> StoreResult<()> {
    let key = candidate.name_key();
    let clash = existing
        .iter()
        .filter(|p| Some(p.id()) != skip_id)
        .any(|p| p.name_key() == key);

    if clash {
        return Err(StoreError::duplicate("name", candidate.name()));
    }
    Ok(())
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn add(&self, product: &Product) -> StoreResult<Product> {
        let mut products = self.products.write().await;

        if products.iter().any(|p| p.id() == product.id()) {
            return Err(StoreError::duplicate("id", product.id()));
        }
        check_unique(&products, product, None)?;

        products.push(product.clone());
        Ok(product.clone())
    }

    async fn get(&self, id: &str) -> StoreResult<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn find_by_name_case_insensitive(&self, name: &str) -> StoreResult<Option<Product>> {
        let key = stockroom_core::validation::name_key(name);
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| p.name_key() == key)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn query(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        skip: u64,
        take: u64,
    ) -> StoreResult<(Vec<Product>, u64)> {
        let snapshot = self.products.read().await.clone();
        Ok(query::apply_query(snapshot, filter, sort, skip, take))
    }

    async fn update(&self, product: &Product) -> StoreResult<Product> {
        let mut products = self.products.write().await;

        let index = products
            .iter()
            .position(|p| p.id() == product.id())
            .ok_or_else(|| StoreError::not_found("Product", product.id()))?;
        check_unique(&products, product, Some(product.id()))?;

        products[index] = product.clone();
        Ok(product.clone())
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        let mut products = self.products.write().await;

        let index = products
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| StoreError::not_found("Product", id))?;

        products.remove(index);
        Ok(())
    }

    async fn sum_price_times_quantity(&self) -> StoreResult<Money> {
        let products = self.products.read().await;
        Money::checked_sum(products.iter().map(Product::stock_value))
            .ok_or_else(|| StoreError::Unavailable("Inventory value overflow".to_string()))
    }

    async fn max_by_price(&self) -> StoreResult<Option<Product>> {
        Ok(query::max_by_price(self.products.read().await.iter()).cloned())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.products.read().await.len() as u64)
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Credential store keyed by exact username.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        MemoryCredentialStore::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Credential>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, credential: &Credential) -> StoreResult<Credential> {
        let mut users = self.users.write().await;

        if users.contains_key(credential.username()) {
            return Err(StoreError::duplicate("username", credential.username()));
        }
        if users.values().any(|c| c.id() == credential.id()) {
            return Err(StoreError::duplicate("id", credential.id()));
        }

        users.insert(credential.username().to_string(), credential.clone());
        Ok(credential.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
