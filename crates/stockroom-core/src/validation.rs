//! # Validation Module
//!
//! Input validation utilities shared by the domain types and services.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (external)                                         │
//! │  └── Deserialization, required fields                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain constructors (Product::new, Credential::new)          │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store                                                        │
//! │  ├── UNIQUE constraints (name key, username)                           │
//! │  └── NOT NULL constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//! use stockroom_core::validation::{validate_price, validate_product_name};
//!
//! assert_eq!(validate_product_name("  Widget ").unwrap(), "Widget");
//! assert!(validate_price(Money::from_cents(-1)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity identifier.
///
/// Identifiers are opaque; the only rule is that they are not blank.
pub fn validate_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    Ok(())
}

/// Validates a product name and returns its trimmed form.
///
/// ```rust
/// use stockroom_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("Coffee Beans 1kg").unwrap(), "Coffee Beans 1kg");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    Ok(name.to_string())
}

/// Validates a username and returns its trimmed form.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    Ok(username.to_string())
}

/// Validates a plaintext password.
///
/// The password is checked as given; whitespace is significant.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    Ok(())
}

/// Normalizes a free-text search query.
///
/// Returns `None` when the query is absent or blank, meaning "match
/// everything".
pub fn normalize_search_query(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// Case-insensitive comparison key for names.
///
/// Used for the catalog-wide name uniqueness rule and for name sorting, so
/// `"Widget"` and `"widget"` collide.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Largest accepted price: 9999999999999999.99, eighteen significant digits
/// with two after the point.
pub const MAX_PRICE: Money = Money::from_cents(999_999_999_999_999_999);

/// Largest accepted stock quantity (32-bit signed range).
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - At most [`MAX_PRICE`]
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::negative("price"));
    }
    if price > MAX_PRICE {
        return Err(ValidationError::exceeds("price", MAX_PRICE));
    }

    Ok(())
}

/// Validates a stock quantity.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (out of stock)
/// - At most [`MAX_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::negative("quantity"));
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::exceeds("quantity", MAX_QUANTITY));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("sku-1").is_ok());
        assert_eq!(validate_id("").unwrap_err(), ValidationError::required("id"));
        assert!(validate_id("   ").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name("  Widget  ").unwrap(), "Widget");
        assert_eq!(
            validate_product_name("").unwrap_err(),
            ValidationError::required("name")
        );
        assert!(validate_product_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert_eq!(validate_username(" alice ").unwrap(), "alice");
        assert!(validate_username("").is_err());

        assert!(validate_password("pw123").is_ok());
        assert!(validate_password(" ").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_normalize_search_query() {
        assert_eq!(normalize_search_query(None), None);
        assert_eq!(normalize_search_query(Some("   ")), None);
        assert_eq!(normalize_search_query(Some(" wid ")), Some("wid".to_string()));
    }

    #[test]
    fn test_name_key_is_case_insensitive() {
        assert_eq!(name_key("Widget"), name_key("wIDGET"));
        assert_eq!(name_key(" Äpfel "), "äpfel");
    }

    #[test]
    fn test_validate_price_and_quantity() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(1099)).is_ok());
        assert_eq!(
            validate_price(Money::from_cents(-1)).unwrap_err(),
            ValidationError::negative("price")
        );

        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(42).is_ok());
        assert_eq!(
            validate_quantity(-1).unwrap_err(),
            ValidationError::negative("quantity")
        );
    }

    #[test]
    fn test_validate_upper_bounds() {
        assert!(validate_price(MAX_PRICE).is_ok());
        assert_eq!(
            validate_price(Money::from_cents(1_000_000_000_000_000_000)).unwrap_err(),
            ValidationError::exceeds("price", "9999999999999999.99")
        );

        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(MAX_QUANTITY + 1).unwrap_err(),
            ValidationError::exceeds("quantity", "2147483647")
        );
    }
}
