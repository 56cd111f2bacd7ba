//! # Services
//!
//! Orchestrators between the HTTP routes and the pure engine in till-core.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BillingService    cart ──► calculate ──► finalize ──► BillStore.save  │
//! │                                                        (one write)      │
//! │                                                                         │
//! │  ReportingService  selector ──► window ──► BillStore.find_* ──► rows    │
//! │                                           (one read)                    │
//! │                                                                         │
//! │  PrintService      bill/report ──► Document ──► text ──► DocumentSink   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod billing;
pub mod ports;
pub mod printing;
pub mod reporting;

pub use billing::{BillingService, CartDirective, InvoiceDetails, InvoiceOutcome};
pub use ports::{BillStore, StoreError, StoreResult};
pub use printing::{DocumentSink, PrintJob, PrintService, SinkError, SpoolSink};
pub use reporting::ReportingService;

use thiserror::Error;
use till_core::{CoreError, ValidationError};

/// Failures of the billing, reporting and printing services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A constraint on the caller's input was violated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cart is empty: add items before creating an invoice")]
    EmptyCart,

    /// The store rejected or failed a write or read.
    ///
    /// ## When This Occurs
    /// - Saving a bill failed; the cart is left as it was
    /// - A stored row could not be decoded
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The store did not answer in time or is closed.
    #[error("Bill store unavailable: {0}")]
    StoreUnavailable(String),

    /// Printing failed. The bill itself stays saved.
    #[error("Printing failed: {0}")]
    RenderFailure(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A stored bill's amounts disagree with each other.
    #[error("{0}")]
    TotalsMismatch(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ServiceError::EmptyCart,
            e @ CoreError::TotalsMismatch { .. } => ServiceError::TotalsMismatch(e.to_string()),
            CoreError::ItemNotInCart(id) => ServiceError::NotFound {
                entity: "Cart item",
                id,
            },
            CoreError::InvalidInput(e) => ServiceError::InvalidInput(e.to_string()),
            e => ServiceError::InvalidInput(e.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ServiceError::StoreUnavailable(msg),
            StoreError::Conflict(msg) | StoreError::Failure(msg) => {
                ServiceError::PersistenceFailure(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_meaning() {
        assert!(matches!(
            ServiceError::from(CoreError::EmptyCart),
            ServiceError::EmptyCart
        ));
        assert!(matches!(
            ServiceError::from(CoreError::CartTooLarge { max: 100 }),
            ServiceError::InvalidInput(_)
        ));

        let err = ServiceError::from(CoreError::from(ValidationError::required("customer name")));
        assert_eq!(err.to_string(), "Invalid input: customer name is required");
    }

    #[test]
    fn test_store_errors_split_by_availability() {
        assert!(matches!(
            ServiceError::from(StoreError::Unavailable("timeout".into())),
            ServiceError::StoreUnavailable(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Failure("disk".into())),
            ServiceError::PersistenceFailure(_)
        ));
    }
}
