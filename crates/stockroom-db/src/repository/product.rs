//! # SQLite Product Store
//!
//! [`ProductStore`] backed by the `products` table.
//!
//! ## Query Translation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 ProductFilter / ProductSort → SQL                       │
//! │                                                                         │
//! │  search "wid"        →  instr(name_key, 'wid') > 0                     │
//! │  min_price 10.00     →  price_cents >= 1000                            │
//! │  max_price 20.00     →  price_cents <= 2000                            │
//! │  low_stock           →  quantity <= 5                                  │
//! │                                                                         │
//! │  SortField::Name     →  ORDER BY name_key  [DESC], id ASC              │
//! │  SortField::Price    →  ORDER BY price_cents [DESC], id ASC            │
//! │                                                                         │
//! │  skip / take         →  LIMIT take OFFSET skip  (take u64::MAX → -1)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `name_key` is computed in Rust with full Unicode lowercasing, so search
//! and ordering agree with the in-memory store byte for byte.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::query::{ProductFilter, ProductSort, SortField};
use stockroom_core::validation::name_key;
use stockroom_core::{Money, Product, ProductStore, StoreResult, LOW_STOCK_THRESHOLD};

const PRODUCT_COLUMNS: &str = "SELECT id, name, price_cents, quantity FROM products";

/// Raw `products` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price_cents: i64,
    quantity: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Product::new(row.id, &row.name, Money::from_cents(row.price_cents), row.quantity)
            .map_err(|e| DbError::CorruptRow(format!("products: {e}")))
    }
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Fills in the value SQLite leaves out of a unique violation.
fn duplicate_product(err: sqlx::Error, product: &Product) -> DbError {
    let err = DbError::from(err);
    match &err {
        DbError::UniqueViolation { field, .. } if field == "id" => err.with_value(product.id()),
        _ => err.with_value(product.name()),
    }
}

/// Cents as stored in `price_cents`. Stored prices always fit; a filter
/// bound outside `i64` clamps, which selects the same rows.
fn sql_cents(amount: Money) -> i64 {
    amount.cents_i64().unwrap_or(if amount.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Appends `WHERE ...` for every criterion set on the filter.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(key) = filter.search_key() {
        qb.push(" AND instr(name_key, ")
            .push_bind(key.to_string())
            .push(") > 0");
    }
    if let Some(min) = filter.min_price() {
        qb.push(" AND price_cents >= ").push_bind(sql_cents(min));
    }
    if let Some(max) = filter.max_price() {
        qb.push(" AND price_cents <= ").push_bind(sql_cents(max));
    }
    if filter.low_stock_only() {
        qb.push(" AND quantity <= ").push_bind(LOW_STOCK_THRESHOLD);
    }
}

fn order_clause(sort: ProductSort) -> &'static str {
    match (sort.field, sort.descending) {
        (SortField::Name, false) => " ORDER BY name_key ASC, id ASC",
        (SortField::Name, true) => " ORDER BY name_key DESC, id ASC",
        (SortField::Price, false) => " ORDER BY price_cents ASC, id ASC",
        (SortField::Price, true) => " ORDER BY price_cents DESC, id ASC",
    }
}

/// SQLite-backed product store.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.products();
/// let page = store.find_page(&filter, ProductSort::default(), 0, 10).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProductStore { pool }
    }

    /// Inserts a product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id or case-insensitive name taken
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id(), name = %product.name(), "Inserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, name_key, price_cents, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(product.id())
        .bind(product.name())
        .bind(product.name_key())
        .bind(sql_cents(product.price()))
        .bind(product.quantity())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_product(e, product))?;

        Ok(product.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Looks a product up by its case-insensitive name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let row =
            sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_COLUMNS} WHERE name_key = ?1"))
                .bind(name_key(name))
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    /// Every product in insertion order.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_COLUMNS} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    /// Runs a filtered, sorted, windowed query.
    ///
    /// ## Returns
    /// The window and the number of rows matching the filter.
    pub async fn find_page(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        skip: u64,
        take: u64,
    ) -> DbResult<(Vec<Product>, u64)> {
        debug!(?filter, ?sort, skip, take, "Querying products");

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut items_query = QueryBuilder::<Sqlite>::new(PRODUCT_COLUMNS);
        push_filter(&mut items_query, filter);
        items_query.push(order_clause(sort));
        items_query
            .push(" LIMIT ")
            .push_bind(i64::try_from(take).unwrap_or(-1))
            .push(" OFFSET ")
            .push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

        let rows: Vec<ProductRow> = items_query.build_query_as().fetch_all(&self.pool).await?;

        Ok((into_products(rows)?, u64::try_from(total).unwrap_or(0)))
    }

    /// Overwrites name, price and quantity of an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no product with this id
    /// * `Err(DbError::UniqueViolation)` - new name collides with another product
    pub async fn replace(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id(), "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                name_key = ?3,
                price_cents = ?4,
                quantity = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(product.id())
        .bind(product.name())
        .bind(product.name_key())
        .bind(sql_cents(product.price()))
        .bind(product.quantity())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_product(e, product))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id()));
        }

        Ok(product.clone())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Σ price × quantity across the catalog.
    ///
    /// Summed in Rust: SQLite turns an overflowing `price_cents * quantity`
    /// into a REAL, which would lose cents.
    pub async fn stock_value(&self) -> DbResult<Money> {
        let lines: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT price_cents, quantity FROM products WHERE price_cents > 0 AND quantity > 0",
        )
        .fetch_all(&self.pool)
        .await?;

        Money::checked_sum(
            lines
                .into_iter()
                .map(|(cents, qty)| Money::from_cents(cents).multiply_quantity(qty)),
        )
        .ok_or_else(|| DbError::Internal("Inventory value overflow".to_string()))
    }

    pub async fn most_expensive(&self) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_COLUMNS} ORDER BY price_cents DESC, id ASC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    pub async fn count_all(&self) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn add(&self, product: &Product) -> StoreResult<Product> {
        Ok(self.insert(product).await?)
    }

    async fn get(&self, id: &str) -> StoreResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id).into())
    }

    async fn find_by_name_case_insensitive(&self, name: &str) -> StoreResult<Option<Product>> {
        Ok(self.find_by_name(name).await?)
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(self.list_all().await?)
    }

    async fn query(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        skip: u64,
        take: u64,
    ) -> StoreResult<(Vec<Product>, u64)> {
        Ok(self.find_page(filter, sort, skip, take).await?)
    }

    async fn update(&self, product: &Product) -> StoreResult<Product> {
        Ok(self.replace(product).await?)
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        Ok(self.delete(id).await?)
    }

    async fn sum_price_times_quantity(&self) -> StoreResult<Money> {
        Ok(self.stock_value().await?)
    }

    async fn max_by_price(&self) -> StoreResult<Option<Product>> {
        Ok(self.most_expensive().await?)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.count_all().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockroom_core::StoreError;

    async fn store() -> SqliteProductStore {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    fn product(id: &str, name: &str, cents: i64, qty: i64) -> Product {
        Product::new(id, name, Money::from_cents(cents), qty).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store().await;
        store.add(&product("p-1", "Widget", 999, 3)).await.unwrap();

        let found = store.get("p-1").await.unwrap();
        assert_eq!(found, product("p-1", "Widget", 999, 3));

        let missing = store.get("nope").await.unwrap_err();
        assert_eq!(missing, StoreError::not_found("Product", "nope"));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_case_insensitive() {
        let store = store().await;
        store.add(&product("p-1", "Widget", 999, 3)).await.unwrap();

        let err = store.add(&product("p-2", "wIDGET", 100, 1)).await.unwrap_err();
        assert_eq!(err, StoreError::duplicate("name", "wIDGET"));

        let err = store.add(&product("p-1", "Gadget", 100, 1)).await.unwrap_err();
        assert_eq!(err, StoreError::duplicate("id", "p-1"));

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_name_case_insensitive() {
        let store = store().await;
        store.add(&product("p-1", "Blue Widget", 999, 3)).await.unwrap();

        let found = store.find_by_name_case_insensitive("  BLUE widget ").await.unwrap();
        assert_eq!(found.map(|p| p.id().to_string()), Some("p-1".to_string()));
        assert!(store.find_by_name_case_insensitive("Widget").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = store().await;
        for (id, name) in [("c", "Zeta"), ("a", "Alpha"), ("b", "Mid")] {
            store.add(&product(id, name, 100, 1)).await.unwrap();
        }

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_query_filters_sorts_and_counts() {
        let store = store().await;
        store.add(&product("1", "Widget", 999, 3)).await.unwrap();
        store.add(&product("2", "gadget", 1500, 20)).await.unwrap();
        store.add(&product("3", "Blue Widget", 2000, 5)).await.unwrap();
        store.add(&product("4", "Sprocket", 2500, 0)).await.unwrap();

        let filter = ProductFilter::new().with_search(Some("WIDG"));
        let (items, total) = store
            .query(&filter, ProductSort::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 2);
        let names: Vec<&str> = items.iter().map(Product::name).collect();
        assert_eq!(names, vec!["Blue Widget", "Widget"]);

        let filter = ProductFilter::new().with_low_stock(true);
        let sort = ProductSort::new(SortField::Price, true);
        let (items, total) = store.query(&filter, sort, 1, 1).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id(), "3");

        let (items, total) = store
            .query(&ProductFilter::new(), ProductSort::default(), 0, u64::MAX)
            .await
            .unwrap();
        assert_eq!((items.len(), total), (4, 4));
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = store().await;
        let original = product("p-1", "Widget", 999, 3);
        store.add(&original).await.unwrap();
        store.add(&product("p-2", "Gadget", 100, 1)).await.unwrap();

        let repriced = original.with_price(Money::from_cents(1299)).unwrap();
        store.update(&repriced).await.unwrap();
        assert_eq!(store.get("p-1").await.unwrap().price().cents(), 1299);

        let clash = Product::new("p-1", "GADGET", Money::zero(), 0).unwrap();
        assert!(matches!(
            store.update(&clash).await,
            Err(StoreError::Duplicate { .. })
        ));

        let ghost = product("ghost", "Ghost", 1, 1);
        assert!(matches!(
            store.update(&ghost).await,
            Err(StoreError::NotFound { .. })
        ));

        store.remove("p-1").await.unwrap();
        assert!(matches!(
            store.remove("p-1").await,
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_aggregates() {
        let store = store().await;
        assert_eq!(store.sum_price_times_quantity().await.unwrap(), Money::zero());
        assert!(store.max_by_price().await.unwrap().is_none());

        store.add(&product("b", "B", 1000, 2)).await.unwrap();
        store.add(&product("a", "A", 1000, 1)).await.unwrap();
        store.add(&product("c", "C", 250, 4)).await.unwrap();

        assert_eq!(
            store.sum_price_times_quantity().await.unwrap(),
            Money::from_cents(4000)
        );
        assert_eq!(
            store.max_by_price().await.unwrap().map(|p| p.id().to_string()),
            Some("a".to_string())
        );
    }
}
