//! # Query Engine
//!
//! Filter, sort and paginate primitives for the product catalog.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Catalog Query Pipeline                            │
//! │                                                                         │
//! │  all products                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductFilter (AND)  name ⊇ search · price ≥ min · price ≤ max ·      │
//! │       │               quantity ≤ LOW_STOCK_THRESHOLD                    │
//! │       │                                                                 │
//! │       ├──────────► total_count (before pagination)                     │
//! │       ▼                                                                 │
//! │  ProductSort          name key | price, asc | desc, then id asc        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  skip (page-1)·page_size, take page_size                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page { items, total_count, page, page_size }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store implementations either run [`apply_query`] directly (in-memory) or
//! translate the same filter and sort into their own query language (SQL).
//! Both must produce the same ordering, including the id tie-break.

use serde::Serialize;
use std::cmp::Ordering;

use crate::money::Money;
use crate::types::Product;
use crate::validation::normalize_search_query;
use crate::{DEFAULT_PAGE_SIZE, LOW_STOCK_THRESHOLD};

// =============================================================================
// Pagination
// =============================================================================

/// A normalized page request.
///
/// ## Normalization
/// - `page < 1` → 1
/// - `page_size < 1` → [`DEFAULT_PAGE_SIZE`]
/// - `page_size > u32::MAX` → `u32::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u64,
    page_size: u32,
}

impl PageRequest {
    /// Normalizes raw, possibly out-of-range, paging parameters.
    ///
    /// ```rust
    /// use stockroom_core::query::PageRequest;
    ///
    /// let req = PageRequest::normalize(0, -3);
    /// assert_eq!(req.page(), 1);
    /// assert_eq!(req.page_size(), 10);
    /// ```
    pub fn normalize(page: i64, page_size: i64) -> Self {
        let page = u64::try_from(page).unwrap_or(0).max(1);
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            u32::try_from(page_size).unwrap_or(u32::MAX)
        };

        PageRequest { page, page_size }
    }

    #[inline]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of matching items to skip. Saturates for pages far past any
    /// real result set.
    #[inline]
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(u64::from(self.page_size))
    }

    /// Number of items to take.
    #[inline]
    pub fn take(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches before pagination.
    pub total_count: u64,
    pub page: u64,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Page {
            items,
            total_count,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// Number of pages needed for `total_count` items.
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size.max(1)))
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Conjunctive product filter. Every criterion is optional.
///
/// ```rust
/// use stockroom_core::{Money, Product};
/// use stockroom_core::query::ProductFilter;
///
/// let filter = ProductFilter::new()
///     .with_search(Some("WID"))
///     .with_max_price(Some(Money::from_cents(1000)));
///
/// let widget = Product::new("p-1", "Blue Widget", Money::from_cents(999), 3).unwrap();
/// assert!(filter.matches(&widget));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Trimmed, lowercased search text.
    search: Option<String>,
    min_price: Option<Money>,
    max_price: Option<Money>,
    low_stock: bool,
}

impl ProductFilter {
    /// A filter that matches every product.
    pub fn new() -> Self {
        ProductFilter::default()
    }

    /// Case-insensitive substring match on name. Blank text is ignored.
    pub fn with_search(mut self, query: Option<&str>) -> Self {
        self.search = normalize_search_query(query).map(|q| q.to_lowercase());
        self
    }

    pub fn with_min_price(mut self, min: Option<Money>) -> Self {
        self.min_price = min;
        self
    }

    pub fn with_max_price(mut self, max: Option<Money>) -> Self {
        self.max_price = max;
        self
    }

    /// Keeps only products at or below [`LOW_STOCK_THRESHOLD`] when `true`.
    pub fn with_low_stock(mut self, low_stock: bool) -> Self {
        self.low_stock = low_stock;
        self
    }

    /// Lowercased search text, if any.
    pub fn search_key(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn min_price(&self) -> Option<Money> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<Money> {
        self.max_price
    }

    pub fn low_stock_only(&self) -> bool {
        self.low_stock
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            if !product.name_key().contains(search.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price() > max {
                return false;
            }
        }
        if self.low_stock && product.quantity() > LOW_STOCK_THRESHOLD {
            return false;
        }
        true
    }
}

// =============================================================================
// Sort
// =============================================================================

/// Field to order query results by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Price,
}

impl SortField {
    /// `"price"` in any case selects price; anything else, including
    /// nothing, selects name.
    pub fn parse(sort_by: Option<&str>) -> Self {
        match sort_by {
            Some(s) if s.eq_ignore_ascii_case("price") => SortField::Price,
            _ => SortField::Name,
        }
    }
}

/// Sort order. Ties on the sort key are broken by id, ascending,
/// regardless of direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductSort {
    pub field: SortField,
    pub descending: bool,
}

impl ProductSort {
    pub fn new(field: SortField, descending: bool) -> Self {
        ProductSort { field, descending }
    }

    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.field {
            SortField::Name => a.name_key().cmp(&b.name_key()),
            SortField::Price => a.price().cmp(&b.price()),
        };
        let primary = if self.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.id().cmp(b.id()))
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Runs filter → count → sort → skip/take over an in-memory collection.
///
/// Returns the page items and the number of matches before pagination.
pub fn apply_query<I>(
    products: I,
    filter: &ProductFilter,
    sort: ProductSort,
    skip: u64,
    take: u64,
) -> (Vec<Product>, u64)
where
    I: IntoIterator<Item = Product>,
{
    let mut matched: Vec<Product> = products
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect();
    let total = matched.len() as u64;

    matched.sort_by(|a, b| sort.compare(a, b));

    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let take = usize::try_from(take).unwrap_or(usize::MAX);
    let items = matched.into_iter().skip(skip).take(take).collect();

    (items, total)
}

/// Highest-priced product; ties go to the smallest id.
pub fn max_by_price<'a, I>(products: I) -> Option<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    products.into_iter().max_by(|a, b| {
        a.price()
            .cmp(&b.price())
            .then_with(|| b.id().cmp(a.id()))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
