//! # Inventory Service
//!
//! Catalog operations over an injected [`ProductStore`].
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Every Mutating Operation                               │
//! │                                                                         │
//! │  input ──► validate ──► read (store) ──► derive new value ──► write     │
//! │              │              │                                  │        │
//! │              ▼              ▼                                  ▼        │
//! │          Validation      NotFound /                        Conflict /   │
//! │          (no store       Conflict                          NotFound     │
//! │           call made)                                      (raced)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no transaction across the read and the write. A concurrent
//! writer can still trip the store's own uniqueness check, which surfaces
//! as the same `Conflict` the pre-check would have raised.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use stockroom_core::query::{PageRequest, ProductFilter, ProductSort, SortField};
use stockroom_core::validation::{normalize_search_query, validate_price, validate_quantity};
use stockroom_core::{Money, NewProduct, Page, Product, ProductStore, StoreError};

use crate::error::{ServiceError, ServiceResult};

const ENTITY: &str = "Product";

fn store_err(err: StoreError) -> ServiceError {
    ServiceError::from_store(ENTITY, err)
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Raw catalog query parameters, as a transport would receive them.
///
/// Paging values are normalized by [`InventoryService::query`], so
/// out-of-range input is accepted here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryParams {
    pub page: i64,
    pub page_size: i64,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub low_stock: Option<bool>,
    /// `"price"` (any case) sorts by price; anything else sorts by name.
    pub sort_by: String,
    pub desc: bool,
    pub search: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            page: 1,
            page_size: i64::from(stockroom_core::DEFAULT_PAGE_SIZE),
            min_price: None,
            max_price: None,
            low_stock: None,
            sort_by: "name".to_string(),
            desc: false,
            search: None,
        }
    }
}

impl QueryParams {
    fn filter(&self) -> ProductFilter {
        ProductFilter::new()
            .with_search(self.search.as_deref())
            .with_min_price(self.min_price)
            .with_max_price(self.max_price)
            .with_low_stock(self.low_stock == Some(true))
    }

    fn sort(&self) -> ProductSort {
        ProductSort::new(SortField::parse(Some(self.sort_by.as_str())), self.desc)
    }
}

// =============================================================================
// Service
// =============================================================================

/// Catalog service. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn ProductStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        InventoryService { store }
    }

    /// Adds a product whose name is not yet taken, ignoring case.
    pub async fn add_product(&self, product: Product) -> ServiceResult<Product> {
        if let Some(existing) = self
            .store
            .find_by_name_case_insensitive(product.name())
            .await
            .map_err(store_err)?
        {
            warn!(name = %product.name(), existing_id = %existing.id(), "Duplicate product name");
            return Err(ServiceError::conflict(ENTITY, "name", product.name()));
        }

        let stored = self.store.add(&product).await.map_err(store_err)?;

        info!(id = %stored.id(), name = %stored.name(), "Product added");
        Ok(stored)
    }

    /// Validates `new`, assigns a fresh id and adds it.
    pub async fn create_product(&self, new: NewProduct) -> ServiceResult<Product> {
        let product = Product::create(&new)?;
        self.add_product(product).await
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Product> {
        self.store.get(id).await.map_err(store_err)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Product>> {
        self.store.list().await.map_err(store_err)
    }

    /// Case-insensitive substring search on name. A blank query returns
    /// the whole catalog.
    pub async fn search(&self, query: Option<&str>) -> ServiceResult<Vec<Product>> {
        let Some(query) = normalize_search_query(query) else {
            return self.list_all().await;
        };

        let filter = ProductFilter::new().with_search(Some(query.as_str()));
        let (items, total) = self
            .store
            .query(&filter, ProductSort::default(), 0, u64::MAX)
            .await
            .map_err(store_err)?;

        debug!(query = %query, total, "Search complete");
        Ok(items)
    }

    /// Filters, sorts and paginates the catalog.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let page = inventory
    ///     .query(&QueryParams {
    ///         sort_by: "price".into(),
    ///         desc: true,
    ///         low_stock: Some(true),
    ///         ..QueryParams::default()
    ///     })
    ///     .await?;
    /// ```
    pub async fn query(&self, params: &QueryParams) -> ServiceResult<Page<Product>> {
        let request = PageRequest::normalize(params.page, params.page_size);

        let (items, total) = self
            .store
            .query(&params.filter(), params.sort(), request.skip(), request.take())
            .await
            .map_err(store_err)?;

        debug!(
            page = request.page(),
            page_size = request.page_size(),
            total,
            returned = items.len(),
            "Query complete"
        );
        Ok(Page::new(items, total, request))
    }

    pub async fn update_price(&self, id: &str, new_price: Money) -> ServiceResult<Product> {
        validate_price(new_price)?;

        let current = self.get_by_id(id).await?;
        let updated = current.with_price(new_price)?;
        let stored = self.store.update(&updated).await.map_err(store_err)?;

        info!(id = %id, old = %current.price(), new = %new_price, "Price updated");
        Ok(stored)
    }

    pub async fn update_quantity(&self, id: &str, new_quantity: i64) -> ServiceResult<Product> {
        validate_quantity(new_quantity)?;

        let current = self.get_by_id(id).await?;
        let updated = current.with_quantity(new_quantity)?;
        let stored = self.store.update(&updated).await.map_err(store_err)?;

        info!(id = %id, old = current.quantity(), new = new_quantity, "Quantity updated");
        Ok(stored)
    }

    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        self.store.remove(id).await.map_err(store_err)?;

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Σ price × quantity; zero for an empty catalog.
    pub async fn total_inventory_value(&self) -> ServiceResult<Money> {
        self.store.sum_price_times_quantity().await.map_err(store_err)
    }

    /// Highest price; ties go to the smallest id.
    pub async fn highest_priced_product(&self) -> ServiceResult<Option<Product>> {
        self.store.max_by_price().await.map_err(store_err)
    }

    pub async fn count(&self) -> ServiceResult<u64> {
        self.store.count().await.map_err(store_err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use stockroom_core::validation::{MAX_PRICE, MAX_QUANTITY};
    use stockroom_db::{Database, DbConfig, MemoryProductStore};

    /// One service per store implementation.
    async fn services() -> Vec<(&'static str, InventoryService)> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        vec![
            ("memory", InventoryService::new(Arc::new(MemoryProductStore::new()))),
            ("sqlite", InventoryService::new(Arc::new(db.products()))),
        ]
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    async fn seed(svc: &InventoryService) {
        for (name, price, qty) in [
            ("Widget", 999, 3),
            ("Gadget", 1500, 20),
            ("Blue Widget", 2000, 5),
            ("Sprocket", 2500, 0),
            ("Axle", 500, 100),
            ("Bolt", 1000, 7),
        ] {
            svc.create_product(NewProduct::new(name, cents(price), qty))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts_ignoring_case() {
        for (label, svc) in services().await {
            svc.create_product(NewProduct::new("Widget", cents(100), 1))
                .await
                .unwrap();

            let err = svc
                .create_product(NewProduct::new("widget", cents(200), 2))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::Conflict, "{label}");
            assert_eq!(svc.count().await.unwrap(), 1, "{label}");
        }
    }

    #[tokio::test]
    async fn test_add_keeps_caller_id() {
        for (label, svc) in services().await {
            let product = Product::new("fixed-id", "Widget", cents(100), 1).unwrap();
            let stored = svc.add_product(product.clone()).await.unwrap();
            assert_eq!(stored, product, "{label}");
            assert_eq!(svc.get_by_id("fixed-id").await.unwrap(), product, "{label}");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        for (label, svc) in services().await {
            let err = svc
                .create_product(NewProduct::new("  ", cents(100), 1))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");

            let err = svc
                .create_product(NewProduct::new("Widget", cents(-1), 1))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");

            assert_eq!(svc.count().await.unwrap(), 0, "{label}");
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        for (label, svc) in services().await {
            let err = svc.get_by_id("missing").await.unwrap_err();
            assert_eq!(err, ServiceError::not_found("Product", "missing"), "{label}");
        }
    }

    #[tokio::test]
    async fn test_search() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let hits = svc.search(Some("  wIdGeT ")).await.unwrap();
            let names: Vec<&str> = hits.iter().map(Product::name).collect();
            assert_eq!(names, vec!["Blue Widget", "Widget"], "{label}");

            assert_eq!(svc.search(None).await.unwrap().len(), 6, "{label}");
            assert_eq!(svc.search(Some("   ")).await.unwrap().len(), 6, "{label}");
            assert!(svc.search(Some("nothing")).await.unwrap().is_empty(), "{label}");
        }
    }

    #[tokio::test]
    async fn test_query_defaults() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let page = svc.query(&QueryParams::default()).await.unwrap();
            assert_eq!(page.total_count, 6, "{label}");
            assert_eq!(page.items.len(), 6, "{label}");
            assert_eq!((page.page, page.page_size), (1, 10), "{label}");

            let names: Vec<&str> = page.items.iter().map(Product::name).collect();
            assert_eq!(
                names,
                vec!["Axle", "Blue Widget", "Bolt", "Gadget", "Sprocket", "Widget"],
                "{label}"
            );
        }
    }

    #[tokio::test]
    async fn test_query_normalizes_paging() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let page = svc
                .query(&QueryParams {
                    page: 0,
                    page_size: -1,
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            assert_eq!((page.page, page.page_size), (1, 10), "{label}");
            assert_eq!(page.items.len(), 6, "{label}");

            let page = svc
                .query(&QueryParams {
                    page: 2,
                    page_size: 4,
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            assert_eq!(page.total_count, 6, "{label}");
            let names: Vec<&str> = page.items.iter().map(Product::name).collect();
            assert_eq!(names, vec!["Sprocket", "Widget"], "{label}");

            let page = svc
                .query(&QueryParams {
                    page: 9,
                    page_size: 4,
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            assert!(page.items.is_empty(), "{label}");
            assert_eq!(page.total_count, 6, "{label}");
        }
    }

    #[tokio::test]
    async fn test_query_price_range() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let page = svc
                .query(&QueryParams {
                    min_price: Some(cents(1000)),
                    max_price: Some(cents(2000)),
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            assert_eq!(page.total_count, 3, "{label}");
            assert!(
                page.items
                    .iter()
                    .all(|p| p.price() >= cents(1000) && p.price() <= cents(2000)),
                "{label}"
            );
        }
    }

    #[tokio::test]
    async fn test_query_low_stock() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let page = svc
                .query(&QueryParams {
                    low_stock: Some(true),
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            assert_eq!(page.total_count, 3, "{label}");
            assert!(page.items.iter().all(|p| p.quantity() <= 5), "{label}");

            let page = svc
                .query(&QueryParams {
                    low_stock: Some(false),
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            assert_eq!(page.total_count, 6, "{label}");
        }
    }

    #[tokio::test]
    async fn test_query_sort_by_price_descending() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let page = svc
                .query(&QueryParams {
                    sort_by: "PRICE".to_string(),
                    desc: true,
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            let prices: Vec<i128> = page.items.iter().map(|p| p.price().cents()).collect();
            assert!(prices.windows(2).all(|w| w[0] >= w[1]), "{label}");
            assert_eq!(prices.first(), Some(&2500), "{label}");
        }
    }

    #[tokio::test]
    async fn test_query_combines_filters() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let page = svc
                .query(&QueryParams {
                    search: Some("widget".to_string()),
                    low_stock: Some(true),
                    min_price: Some(cents(1000)),
                    ..QueryParams::default()
                })
                .await
                .unwrap();
            let names: Vec<&str> = page.items.iter().map(Product::name).collect();
            assert_eq!(names, vec!["Blue Widget"], "{label}");
        }
    }

    #[test]
    fn test_query_params_deserialize_with_defaults() {
        let params: QueryParams =
            serde_json::from_str(r#"{"sortBy":"price","lowStock":true,"minPrice":1000}"#).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
        assert_eq!(params.sort_by, "price");
        assert_eq!(params.low_stock, Some(true));
        assert_eq!(params.min_price, Some(cents(1000)));
        assert!(!params.desc);
    }

    #[tokio::test]
    async fn test_update_price_and_quantity() {
        for (label, svc) in services().await {
            let p = svc
                .create_product(NewProduct::new("Widget", cents(999), 3))
                .await
                .unwrap();

            let repriced = svc.update_price(p.id(), cents(1299)).await.unwrap();
            assert_eq!(repriced.price(), cents(1299), "{label}");
            assert_eq!(repriced.quantity(), 3, "{label}");

            let restocked = svc.update_quantity(p.id(), 40).await.unwrap();
            assert_eq!(restocked.quantity(), 40, "{label}");
            assert_eq!(restocked.price(), cents(1299), "{label}");

            assert_eq!(svc.get_by_id(p.id()).await.unwrap(), restocked, "{label}");
        }
    }

    #[tokio::test]
    async fn test_negative_updates_validate_before_lookup() {
        for (label, svc) in services().await {
            // Validation wins even for an id that does not exist.
            let err = svc.update_price("missing", cents(-1)).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");

            let err = svc.update_quantity("missing", -1).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");

            let err = svc.update_price("missing", cents(1)).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotFound, "{label}");
        }
    }

    #[tokio::test]
    async fn test_delete() {
        for (label, svc) in services().await {
            let p = svc
                .create_product(NewProduct::new("Widget", cents(100), 1))
                .await
                .unwrap();

            svc.delete_product(p.id()).await.unwrap();
            assert_eq!(svc.count().await.unwrap(), 0, "{label}");

            let err = svc.delete_product(p.id()).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NotFound, "{label}");
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_aggregates() {
        for (label, svc) in services().await {
            assert_eq!(svc.total_inventory_value().await.unwrap(), Money::zero(), "{label}");
            assert!(svc.highest_priced_product().await.unwrap().is_none(), "{label}");
            assert!(svc.list_all().await.unwrap().is_empty(), "{label}");
        }
    }

    #[tokio::test]
    async fn test_inventory_value_tracks_mutations() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let expected = |items: &[Product]| -> Money {
                Money::checked_sum(items.iter().map(Product::stock_value)).unwrap()
            };

            let before = svc.total_inventory_value().await.unwrap();
            assert_eq!(before, expected(&svc.list_all().await.unwrap()), "{label}");

            let widget = svc
                .create_product(NewProduct::new("Hinge", "9.99".parse().unwrap(), 3))
                .await
                .unwrap();
            assert_eq!(
                svc.total_inventory_value().await.unwrap(),
                before.checked_add(cents(2997)).unwrap(),
                "{label}"
            );

            svc.update_quantity(widget.id(), 10).await.unwrap();
            assert_eq!(
                svc.total_inventory_value().await.unwrap(),
                expected(&svc.list_all().await.unwrap()),
                "{label}"
            );

            svc.delete_product(widget.id()).await.unwrap();
            assert_eq!(svc.total_inventory_value().await.unwrap(), before, "{label}");
        }
    }

    #[tokio::test]
    async fn test_inventory_value_beyond_i64_is_exact() {
        for (label, svc) in services().await {
            svc.create_product(NewProduct::new("Jet", cents(10_000_000_000), 1_000_000_000))
                .await
                .unwrap();
            svc.create_product(NewProduct::new("Hangar", MAX_PRICE, MAX_QUANTITY))
                .await
                .unwrap();

            let expected = 10_000_000_000_i128 * 1_000_000_000
                + MAX_PRICE.cents() * i128::from(MAX_QUANTITY);
            assert_eq!(
                svc.total_inventory_value().await.unwrap().cents(),
                expected,
                "{label}"
            );
        }
    }

    #[tokio::test]
    async fn test_values_above_bounds_are_rejected() {
        for (label, svc) in services().await {
            let err = svc
                .create_product(NewProduct::new("Crate", cents(100), MAX_QUANTITY + 1))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");

            let p = svc
                .create_product(NewProduct::new("Crate", cents(100), 1))
                .await
                .unwrap();
            let err = svc
                .update_price(p.id(), Money::from_cents(1_000_000_000_000_000_000))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "{label}");
            assert_eq!(svc.get_by_id(p.id()).await.unwrap(), p, "{label}");
        }
    }

    #[tokio::test]
    async fn test_highest_priced_product() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let top = svc.highest_priced_product().await.unwrap().unwrap();
            assert_eq!(top.name(), "Sprocket", "{label}");
        }
    }

    #[tokio::test]
    async fn test_list_all_is_insertion_ordered() {
        for (label, svc) in services().await {
            seed(&svc).await;

            let names: Vec<String> = svc
                .list_all()
                .await
                .unwrap()
                .iter()
                .map(|p| p.name().to_string())
                .collect();
            assert_eq!(
                names,
                vec!["Widget", "Gadget", "Blue Widget", "Sprocket", "Axle", "Bolt"],
                "{label}"
            );
        }
    }
}
