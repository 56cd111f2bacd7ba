//! # API Error Type
//!
//! What an HTTP client sees when a request fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ─► CoreError ─┐                                        │
//! │                                ├─► ServiceError ─► ApiError ─► HTTP     │
//! │  DbError ─► StoreError ────────┘                  { code, message }     │
//! │                                                                         │
//! │  DbError (item routes) ──────────────────────────► ApiError             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "code": "EMPTY_CART",
//!   "message": "Cart is empty: add items before creating an invoice"
//! }
//! ```
//!
//! Internal failures are logged with their detail and returned with a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use till_core::{CoreError, ValidationError};
use till_db::DbError;

use crate::services::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// const res = await fetch('/api/cart/checkout', { method: 'POST', body });
/// if (!res.ok) {
///   const e = await res.json();
///   switch (e.code) {
///     case 'EMPTY_CART':
///       message.warning('Add items before billing');
///       break;
///     case 'VALIDATION_ERROR':
///       form.setError(e.message);
///       break;
///     default:
///       message.error('Something went wrong');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Checkout with nothing in the cart (422)
    EmptyCart,

    /// Cart limits exceeded (422)
    CartError,

    /// Duplicate resource (409)
    Conflict,

    /// Saving or loading data failed (500)
    PersistenceFailure,

    /// Bill store did not answer in time (503)
    StoreUnavailable,

    /// Printing failed (502)
    RenderFailure,

    /// Stored bill amounts disagree (500)
    TotalsMismatch,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::EmptyCart | ErrorCode::CartError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::RenderFailure => StatusCode::BAD_GATEWAY,
            ErrorCode::PersistenceFailure | ErrorCode::TotalsMismatch => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => ApiError::validation(msg),
            ServiceError::EmptyCart => {
                ApiError::new(ErrorCode::EmptyCart, ServiceError::EmptyCart.to_string())
            }
            ServiceError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            ServiceError::PersistenceFailure(detail) => {
                error!(%detail, "Persistence failure");
                ApiError::new(
                    ErrorCode::PersistenceFailure,
                    "Could not save or load data. Nothing was changed.",
                )
            }
            ServiceError::StoreUnavailable(detail) => {
                warn!(%detail, "Bill store unavailable");
                ApiError::new(
                    ErrorCode::StoreUnavailable,
                    "Storage is temporarily unavailable. Please retry.",
                )
            }
            ServiceError::RenderFailure(detail) => {
                error!(%detail, "Print failure");
                ApiError::new(ErrorCode::RenderFailure, format!("Printing failed: {detail}"))
            }
            ServiceError::TotalsMismatch(detail) => {
                error!(%detail, "Bill totals mismatch");
                ApiError::new(ErrorCode::TotalsMismatch, detail)
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotInCart(id) => ApiError::not_found("Cart item", &id),
            e @ (CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. }) => {
                ApiError::new(ErrorCode::CartError, e.to_string())
            }
            CoreError::InvalidInput(e) => ApiError::validation(e.to_string()),
            other => ServiceError::from(other).into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Database errors from the item routes, which use the repository directly.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::CheckViolation(detail) => {
                warn!(%detail, "Constraint violated");
                ApiError::validation("Value violates a data constraint")
            }
            e if e.is_unavailable() => {
                warn!(error = %e, "Database unavailable");
                ApiError::new(
                    ErrorCode::StoreUnavailable,
                    "Storage is temporarily unavailable. Please retry.",
                )
            }
            e => {
                error!(error = %e, "Database operation failed");
                ApiError::new(ErrorCode::PersistenceFailure, "Database operation failed")
            }
        }
    }
}
