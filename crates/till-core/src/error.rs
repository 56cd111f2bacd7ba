//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule and integrity failures           │
//! │  └── ValidationError  - Input constraint violations (InvalidInput)     │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  till-server errors                                                    │
//! │  ├── ServiceError     - Orchestrator failures (store, print)           │
//! │  └── ApiError         - What the HTTP client sees (code + message)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `ValidationError` names the field and the violated constraint so the
//! caller can show a specific message.

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invoice creation was attempted with no line items.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: (empty)
    ///      │
    ///      ▼
    /// "Generate Bill" clicked
    ///      │
    ///      ▼
    /// EmptyCart ──► UI shows: "Add items to the cart before billing"
    /// ```
    #[error("Cart is empty: add items before creating an invoice")]
    EmptyCart,

    /// Item is not present in the cart.
    #[error("Item {0} is not in the cart")]
    ItemNotInCart(String),

    /// Cart has exceeded maximum allowed distinct items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A stored bill's amounts disagree with each other.
    ///
    /// Raised by the invoice renderer. The subtotal shown on an invoice is
    /// `total - tax`; it must equal both the stored subtotal and the sum of
    /// the line items. A mismatch means the bill was computed or stored
    /// incorrectly.
    #[error(
        "Bill {bill_id} totals disagree: stored subtotal {stored}, \
         total minus tax {derived}, line items {from_lines}"
    )]
    TotalsMismatch {
        bill_id: String,
        stored: Money,
        derived: Money,
        from_lines: Money,
    },

    /// Caller supplied input that violates a constraint.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These surface to callers as `InvalidInput`.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid phone number, tax rate too precise).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Date range whose start falls after its end.
    #[error("date range start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// Arithmetic on the value would overflow the money representation.
    #[error("{field} is too large to compute")]
    Overflow { field: String },

    /// The same cart item appears twice with different unit prices.
    #[error("item {item_id} appears with conflicting unit prices")]
    ConflictingPrice { item_id: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::MustBePositive`].
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::Overflow`].
    pub fn overflow(field: impl Into<String>) -> Self {
        ValidationError::Overflow {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
