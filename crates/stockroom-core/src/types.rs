//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Credential    │   │    ClaimSet     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  subject        │       │
//! │  │  name           │   │  username       │   │  username       │       │
//! │  │  price (Money)  │   │  password_hash  │   │  role           │       │
//! │  │  quantity       │   │  role           │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Product and Credential are independent aggregates.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Immutability
//! Fields are private. A `Product` can only be obtained through a validating
//! constructor, and "changes" produce a new value via [`Product::with_price`]
//! or [`Product::with_quantity`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    self, validate_id, validate_price, validate_product_name, validate_quantity,
    validate_username, ValidationResult,
};
use crate::LOW_STOCK_THRESHOLD;

/// Role given to users who register without one.
pub const ROLE_USER: &str = "User";

/// Role that transports conventionally gate catalog mutations behind.
pub const ROLE_ADMIN: &str = "Admin";

/// Generates a fresh entity identifier (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item.
///
/// ## Invariants
/// - `id` is not blank
/// - `name` is not blank and is stored trimmed
/// - `0 <= price <= MAX_PRICE`
/// - `0 <= quantity <= MAX_QUANTITY`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductData")]
pub struct Product {
    id: String,
    name: String,
    price: Money,
    quantity: i64,
}

impl Product {
    /// Creates a product, validating every field.
    ///
    /// ```rust
    /// use stockroom_core::{Money, Product};
    ///
    /// let p = Product::new("p-1", "  Widget ", Money::from_cents(999), 3).unwrap();
    /// assert_eq!(p.name(), "Widget");
    ///
    /// assert!(Product::new("p-1", "Widget", Money::from_cents(-1), 3).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: &str,
        price: Money,
        quantity: i64,
    ) -> ValidationResult<Self> {
        let id = id.into();
        validate_id(&id)?;
        let name = validate_product_name(name)?;
        validate_price(price)?;
        validate_quantity(quantity)?;

        Ok(Product {
            id,
            name,
            price,
            quantity,
        })
    }

    /// Creates a product with a freshly generated id.
    pub fn create(new: &NewProduct) -> ValidationResult<Self> {
        Product::new(generate_id(), &new.name, new.price, new.quantity)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive key used for uniqueness and name ordering.
    pub fn name_key(&self) -> String {
        validation::name_key(&self.name)
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    #[inline]
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Stock value of this line: price × quantity. Never overflows.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Whether the quantity is at or below the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= LOW_STOCK_THRESHOLD
    }

    /// Returns a copy with a new price; everything else unchanged.
    pub fn with_price(&self, price: Money) -> ValidationResult<Self> {
        Product::new(self.id.clone(), &self.name, price, self.quantity)
    }

    /// Returns a copy with a new quantity; everything else unchanged.
    pub fn with_quantity(&self, quantity: i64) -> ValidationResult<Self> {
        Product::new(self.id.clone(), &self.name, self.price, quantity)
    }
}

/// Unvalidated wire shape of a [`Product`].
#[derive(Deserialize)]
struct ProductData {
    id: String,
    name: String,
    price: Money,
    quantity: i64,
}

impl TryFrom<ProductData> for Product {
    type Error = ValidationError;

    fn try_from(data: ProductData) -> Result<Self, Self::Error> {
        Product::new(data.id, &data.name, data.price, data.quantity)
    }
}

/// Input for creating a product whose id has not been assigned yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub quantity: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Money, quantity: i64) -> Self {
        NewProduct {
            name: name.into(),
            price,
            quantity,
        }
    }
}

// =============================================================================
// Credential
// =============================================================================

/// A stored user credential.
///
/// `password_hash` is an adaptive one-way hash (PHC string). The plaintext
/// password never reaches this type.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    id: String,
    username: String,
    password_hash: String,
    role: String,
}

impl Credential {
    /// Creates a credential. A blank or absent role becomes [`ROLE_USER`].
    pub fn new(
        id: impl Into<String>,
        username: &str,
        password_hash: impl Into<String>,
        role: Option<&str>,
    ) -> ValidationResult<Self> {
        let id = id.into();
        validate_id(&id)?;
        let username = validate_username(username)?;

        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(ValidationError::required("password_hash"));
        }

        Ok(Credential {
            id,
            username,
            password_hash,
            role: normalize_role(role),
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    #[inline]
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Returns the trimmed role, or [`ROLE_USER`] when absent or blank.
pub fn normalize_role(role: Option<&str>) -> String {
    match role.map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => ROLE_USER.to_string(),
    }
}

// =============================================================================
// Claim Set
// =============================================================================

/// What a token asserts about the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// User id.
    pub subject: String,
    pub username: String,
    pub role: String,
}

impl ClaimSet {
    pub fn for_credential(credential: &Credential) -> Self {
        ClaimSet {
            subject: credential.id().to_string(),
            username: credential.username().to_string(),
            role: credential.role().to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_product_new_trims_name() {
        let p = Product::new("p-1", "  Widget  ", Money::from_cents(999), 3).unwrap();
        assert_eq!(p.id(), "p-1");
        assert_eq!(p.name(), "Widget");
        assert_eq!(p.price().cents(), 999);
        assert_eq!(p.quantity(), 3);
        assert_eq!(p.stock_value().cents(), 2997);
    }

    #[test]
    fn test_product_new_names_offending_field() {
        let err = Product::new("", "Widget", Money::zero(), 0).unwrap_err();
        assert_eq!(err.field(), "id");

        let err = Product::new("p-1", " ", Money::zero(), 0).unwrap_err();
        assert_eq!(err.field(), "name");

        let err = Product::new("p-1", "Widget", Money::from_cents(-1), 0).unwrap_err();
        assert_eq!(err.field(), "price");

        let err = Product::new("p-1", "Widget", Money::zero(), -1).unwrap_err();
        assert_eq!(err.field(), "quantity");
    }

    #[test]
    fn test_derived_updates_leave_original_untouched() {
        let original = Product::new("p-1", "Widget", Money::from_cents(500), 10).unwrap();

        let repriced = original.with_price(Money::from_cents(750)).unwrap();
        assert_eq!(repriced.price().cents(), 750);
        assert_eq!(repriced.quantity(), 10);
        assert_eq!(repriced.id(), original.id());
        assert_eq!(original.price().cents(), 500);

        let restocked = original.with_quantity(2).unwrap();
        assert_eq!(restocked.quantity(), 2);
        assert_eq!(restocked.price().cents(), 500);

        assert!(original.with_price(Money::from_cents(-5)).is_err());
        assert!(original.with_quantity(-5).is_err());
    }

    #[test]
    fn test_low_stock_threshold() {
        let at = Product::new("a", "At", Money::zero(), LOW_STOCK_THRESHOLD).unwrap();
        let above = Product::new("b", "Above", Money::zero(), LOW_STOCK_THRESHOLD + 1).unwrap();
        assert!(at.is_low_stock());
        assert!(!above.is_low_stock());
    }

    #[test]
    fn test_create_generates_uuid() {
        let p = Product::create(&NewProduct::new("Widget", Money::from_cents(1), 1)).unwrap();
        assert!(Uuid::parse_str(p.id()).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Product =
            serde_json::from_str(r#"{"id":"p-1","name":" Gadget ","price":250,"quantity":4}"#)
                .unwrap();
        assert_eq!(ok.name(), "Gadget");

        let bad = serde_json::from_str::<Product>(
            r#"{"id":"p-1","name":"Gadget","price":-250,"quantity":4}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_credential_role_defaults_and_redaction() {
        let c = Credential::new("u-1", "alice", "$argon2id$hash", None).unwrap();
        assert_eq!(c.role(), ROLE_USER);

        let c = Credential::new("u-1", "alice", "$argon2id$hash", Some("  ")).unwrap();
        assert_eq!(c.role(), ROLE_USER);

        let c = Credential::new("u-1", "alice", "$argon2id$hash", Some(ROLE_ADMIN)).unwrap();
        assert_eq!(c.role(), ROLE_ADMIN);

        let debug = format!("{:?}", c);
        assert!(!debug.contains("argon2id"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_claim_set_for_credential() {
        let c = Credential::new("u-1", "alice", "hash", None).unwrap();
        let claims = ClaimSet::for_credential(&c);
        assert_eq!(claims.subject, "u-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, ROLE_USER);
    }

    proptest! {
        #[test]
        fn prop_non_negative_fields_always_construct(
            cents in 0i64..1_000_000_000,
            qty in 0i64..1_000_000,
        ) {
            let p = Product::new("p-1", "Widget", Money::from_cents(cents), qty);
            prop_assert!(p.is_ok());
        }

        #[test]
        fn prop_negative_price_always_rejected(cents in i64::MIN..0, qty in 0i64..1_000) {
            let err = Product::new("p-1", "Widget", Money::from_cents(cents), qty).unwrap_err();
            prop_assert_eq!(err, ValidationError::negative("price"));
        }

        #[test]
        fn prop_negative_quantity_always_rejected(cents in 0i64..1_000, qty in i64::MIN..0) {
            let err = Product::new("p-1", "Widget", Money::from_cents(cents), qty).unwrap_err();
            prop_assert_eq!(err, ValidationError::negative("quantity"));
        }

        #[test]
        fn prop_quantity_above_i32_range_rejected(qty in (i32::MAX as i64 + 1)..i64::MAX) {
            let err = Product::new("p-1", "Widget", Money::from_cents(100), qty).unwrap_err();
            prop_assert_eq!(err.field(), "quantity");
        }
    }
}
