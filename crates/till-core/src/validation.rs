//! # Validation Module
//!
//! Input validation for Till POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web frontend                                                 │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (serde)                                         │
//! │  └── Shape and type of the request body                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE + calculator                                     │
//! │  └── Business rules, each failure names its field                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: SQLite                                                       │
//! │  └── NOT NULL, UNIQUE(request_id), CHECK constraints                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_customer_phone, validate_quantity};
//!
//! validate_quantity(5).unwrap();
//! validate_customer_phone("+91 98765 43210").unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_trimmed<'a>(value: &'a str, field: &str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value)
}

/// Validates a catalog item name (1-200 characters after trimming).
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Masala Chai").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required_trimmed(name, "name", 200).map(|_| ())
}

/// Validates a category label (1-50 characters).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    required_trimmed(category, "category", 50).map(|_| ())
}

/// Validates the customer name printed on an invoice.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_trimmed(name, "customer name", 100).map(|_| ())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Required
/// - Digits plus optional leading `+`, spaces and hyphens
/// - 7 to 15 digits (E.164 allows at most 15)
pub fn validate_customer_phone(phone: &str) -> ValidationResult<()> {
    let phone = required_trimmed(phone, "customer phone", 20)?;

    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "customer phone".to_string(),
            reason: "must contain only digits, spaces, hyphens and a leading +".to_string(),
        });
    }

    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidFormat {
            field: "customer phone".to_string(),
            reason: "must have between 7 and 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates the item name of a by-item report and returns it trimmed.
pub fn validate_report_item_name(name: Option<&str>) -> ValidationResult<String> {
    let name = name.ok_or_else(|| ValidationError::required("item name"))?;
    required_trimmed(name, "item name", 200).map(str::to_string)
}

/// Validates an idempotency key supplied with an invoice request.
pub fn validate_request_id(request_id: &str) -> ValidationResult<()> {
    let trimmed = required_trimmed(request_id, "request id", 64)?;
    if trimmed.len() != request_id.len() {
        return Err(ValidationError::InvalidFormat {
            field: "request id".to_string(),
            reason: "must not have leading or trailing whitespace".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// Cashier sets quantity: 5
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → "quantity must be positive"
///      ├── qty > 999? → "quantity must be between 1 and 999"
///      └── OK → cart updated
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a catalog price in minor units. Zero is allowed on the menu.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a unit price on a bill line. Must be strictly positive.
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::must_be_positive("unit price"));
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct item fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
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
    fn test_validate_item_name() {
        assert!(validate_item_name("Masala Chai").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(201)).is_err());
        assert!(validate_item_name(&"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("drinks").is_ok());
        assert!(validate_category(" ").is_err());
    }

    #[test]
    fn test_validate_customer_phone() {
        assert!(validate_customer_phone("9876543210").is_ok());
        assert!(validate_customer_phone("+91 98765-43210").is_ok());

        assert!(validate_customer_phone("").is_err());
        assert!(validate_customer_phone("12345").is_err());
        assert!(validate_customer_phone("98765abc10").is_err());
        assert!(validate_customer_phone("9+876543210").is_err());
    }

    #[test]
    fn test_validate_report_item_name() {
        assert_eq!(validate_report_item_name(Some("  Tea ")).unwrap(), "Tea");
        assert!(matches!(
            validate_report_item_name(None),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_report_item_name(Some("  ")).is_err());
    }

    #[test]
    fn test_validate_request_id() {
        assert!(validate_request_id("7f1c2a").is_ok());
        assert!(validate_request_id("").is_err());
        assert!(validate_request_id(" abc").is_err());
        assert!(validate_request_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());

        assert!(validate_unit_price_cents(1).is_ok());
        assert!(validate_unit_price_cents(0).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
