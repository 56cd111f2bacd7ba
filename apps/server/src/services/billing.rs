//! # Billing Service
//!
//! Turns the register cart into a persisted bill.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_invoice(cart, details)                                          │
//! │       │                                                                 │
//! │       ├── request id seen before? ──► existing bill, cart_directive Keep│
//! │       ├── cart empty? ─────────────────────────► EmptyCart             │
//! │       ├── tax / name / phone invalid? ─────────► InvalidInput (no I/O) │
//! │       ▼                                                                 │
//! │  InvoiceRequest::finalize  (till-core, pure)                           │
//! │       │                                                                 │
//! │  BillStore::save ── fails ──► PersistenceFailure / StoreUnavailable    │
//! │       │                       (cart untouched)                          │
//! │       ▼                                                                 │
//! │  InvoiceOutcome { bill, cart_directive: Clear }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service never touches the cart itself. The caller applies the
//! returned [`CartDirective`] once it has the outcome in hand.
//!
//! A replayed request id is looked up before the empty-cart check: a retry
//! after a lost response arrives with the cart already cleared. Replays
//! return [`CartDirective::Keep`], since whatever is in the cart now was
//! not billed by this call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use till_core::validation::validate_request_id;
use till_core::{Bill, Cart, InvoiceRequest, PaymentMethod, TaxRate};

use super::ports::{timed, BillStore, StoreError};
use super::{ServiceError, ServiceResult};

/// What the caller should do with its cart after a successful invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartDirective {
    /// The cart was billed by this call.
    Clear,
    /// An earlier bill was replayed; the cart was not billed.
    Keep,
}

impl CartDirective {
    pub fn apply(self, cart: &mut Cart) {
        match self {
            CartDirective::Clear => cart.clear(),
            CartDirective::Keep => {}
        }
    }
}

/// The billing form, minus the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub tax_rate_percent: f64,
    pub payment_method: PaymentMethod,
    /// Idempotency key supplied by the client.
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceOutcome {
    pub bill: Bill,
    pub cart_directive: CartDirective,
    /// True when `request_id` matched an earlier bill and nothing was written.
    pub replayed: bool,
}

pub struct BillingService {
    store: Arc<dyn BillStore>,
    store_timeout: Duration,
}

impl BillingService {
    pub fn new(store: Arc<dyn BillStore>, store_timeout: Duration) -> Self {
        BillingService {
            store,
            store_timeout,
        }
    }

    /// Creates and persists a bill from the cart contents.
    ///
    /// ## Errors
    /// - `EmptyCart` if the cart has no lines and no earlier bill matches the
    ///   request id (without a request id the store is never called)
    /// - `InvalidInput` for a bad tax rate, name, phone or request id
    /// - `PersistenceFailure` / `StoreUnavailable` if the save fails
    pub async fn create_invoice(
        &self,
        cart: &Cart,
        details: InvoiceDetails,
    ) -> ServiceResult<InvoiceOutcome> {
        let request_id = match details.request_id {
            Some(key) => {
                validate_request_id(&key)?;
                Some(key)
            }
            None => None,
        };

        if let Some(key) = &request_id {
            if let Some(existing) = self.find_by_request_id(key).await? {
                info!(bill_id = %existing.id, request_id = %key, "Replaying existing bill");
                return Ok(Self::replayed(existing));
            }
        }

        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let tax_rate = TaxRate::try_from_percentage(details.tax_rate_percent)?;

        let request = InvoiceRequest {
            customer_name: details.customer_name,
            customer_phone: details.customer_phone,
            tax_rate,
            payment_method: details.payment_method,
            line_items: cart.snapshot(),
            request_id: request_id.clone(),
        };
        let bill = request.finalize(Uuid::new_v4().to_string(), Utc::now().trunc_subsecs(6))?;

        debug!(
            bill_id = %bill.id,
            items = bill.line_items.len(),
            total_cents = bill.total_amount.cents(),
            "Saving bill"
        );

        let saved = timed(self.store_timeout, "save", self.store.save(bill)).await;
        match saved {
            Ok(bill) => {
                info!(
                    bill_id = %bill.id,
                    total = %bill.total_amount,
                    payment_method = %bill.payment_method,
                    "Bill created"
                );
                Ok(InvoiceOutcome {
                    bill,
                    cart_directive: CartDirective::Clear,
                    replayed: false,
                })
            }
            Err(StoreError::Conflict(msg)) => {
                // Lost a race with a concurrent request carrying the same key
                if let Some(key) = &request_id {
                    if let Some(existing) = self.find_by_request_id(key).await? {
                        return Ok(Self::replayed(existing));
                    }
                }
                warn!(error = %msg, "Bill save rejected");
                Err(ServiceError::PersistenceFailure(msg))
            }
            Err(e) => {
                warn!(error = %e, "Bill save failed; cart left intact");
                Err(e.into())
            }
        }
    }

    /// All bills, newest first.
    pub async fn list_bills(&self) -> ServiceResult<Vec<Bill>> {
        Ok(timed(self.store_timeout, "find_all", self.store.find_all()).await?)
    }

    pub async fn get_bill(&self, id: &str) -> ServiceResult<Bill> {
        timed(self.store_timeout, "find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "Bill",
                id: id.to_string(),
            })
    }

    pub async fn delete_bill(&self, id: &str) -> ServiceResult<()> {
        let deleted = timed(self.store_timeout, "delete", self.store.delete(id)).await?;
        if !deleted {
            return Err(ServiceError::NotFound {
                entity: "Bill",
                id: id.to_string(),
            });
        }
        info!(bill_id = %id, "Bill deleted");
        Ok(())
    }

    async fn find_by_request_id(&self, key: &str) -> ServiceResult<Option<Bill>> {
        Ok(timed(
            self.store_timeout,
            "find_by_request_id",
            self.store.find_by_request_id(key),
        )
        .await?)
    }

    fn replayed(bill: Bill) -> InvoiceOutcome {
        InvoiceOutcome {
            bill,
            cart_directive: CartDirective::Keep,
            replayed: true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ports::memory::{Fault, MemoryBillStore};
    use till_core::{LineItem, Money};

    fn tea_and_cake() -> Cart {
        Cart::from_line_items([
            LineItem::new("tea", "Tea", Money::from_major(20), 3),
            LineItem::new("cake", "Cake", Money::from_major(150), 1),
        ])
        .unwrap()
    }

    fn details(request_id: Option<&str>) -> InvoiceDetails {
        InvoiceDetails {
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            tax_rate_percent: 10.0,
            payment_method: PaymentMethod::Upi,
            request_id: request_id.map(str::to_string),
        }
    }

    fn service(store: Arc<MemoryBillStore>) -> BillingService {
        BillingService::new(store, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_create_invoice_persists_and_asks_to_clear() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let outcome = billing
            .create_invoice(&tea_and_cake(), details(None))
            .await
            .unwrap();

        assert_eq!(outcome.bill.subtotal, Money::from_major(210));
        assert_eq!(outcome.bill.tax_amount, Money::from_major(21));
        assert_eq!(outcome.bill.total_amount, Money::from_major(231));
        assert_eq!(outcome.cart_directive, CartDirective::Clear);
        assert!(!outcome.replayed);
        assert_eq!(store.len().await, 1);

        let mut cart = tea_and_cake();
        outcome.cart_directive.apply(&mut cart);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_store() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let result = billing.create_invoice(&Cart::new(), details(None)).await;

        assert!(matches!(result, Err(ServiceError::EmptyCart)));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let mut bad_tax = details(None);
        bad_tax.tax_rate_percent = 120.0;
        assert!(matches!(
            billing.create_invoice(&tea_and_cake(), bad_tax).await,
            Err(ServiceError::InvalidInput(_))
        ));

        let mut bad_name = details(None);
        bad_name.customer_name = "   ".to_string();
        assert!(matches!(
            billing.create_invoice(&tea_and_cake(), bad_name).await,
            Err(ServiceError::InvalidInput(_))
        ));

        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_is_persistence_failure() {
        let store = Arc::new(MemoryBillStore::with_fault(Fault::FailWrites));
        let billing = service(store);

        let result = billing.create_invoice(&tea_and_cake(), details(None)).await;
        assert!(matches!(result, Err(ServiceError::PersistenceFailure(_))));
    }

    #[tokio::test]
    async fn test_hanging_store_is_unavailable() {
        let store = Arc::new(MemoryBillStore::with_fault(Fault::Hang));
        let billing = service(store);

        let result = billing.create_invoice(&tea_and_cake(), details(None)).await;
        assert!(matches!(result, Err(ServiceError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_request_id_replays_existing_bill() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let first = billing
            .create_invoice(&tea_and_cake(), details(Some("till-1-0001")))
            .await
            .unwrap();
        let second = billing
            .create_invoice(&tea_and_cake(), details(Some("till-1-0001")))
            .await
            .unwrap();

        assert_eq!(first.bill.id, second.bill.id);
        assert!(second.replayed);
        assert_eq!(second.cart_directive, CartDirective::Keep);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_retry_with_cleared_cart_replays() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let mut cart = tea_and_cake();
        let first = billing
            .create_invoice(&cart, details(Some("till-1-0002")))
            .await
            .unwrap();
        first.cart_directive.apply(&mut cart);
        assert!(cart.is_empty());

        // Response lost; the register retries with the same key
        let retry = billing
            .create_invoice(&cart, details(Some("till-1-0002")))
            .await
            .unwrap();

        assert!(retry.replayed);
        assert_eq!(retry.bill, first.bill);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_replay_keeps_new_cart_contents() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let mut cart = tea_and_cake();
        let first = billing
            .create_invoice(&cart, details(Some("till-1-0003")))
            .await
            .unwrap();
        first.cart_directive.apply(&mut cart);

        cart.add_line(LineItem::new("cake", "Cake", Money::from_major(150), 2))
            .unwrap();
        let stale = billing
            .create_invoice(&cart, details(Some("till-1-0003")))
            .await
            .unwrap();
        stale.cart_directive.apply(&mut cart);

        assert!(stale.replayed);
        assert_eq!(stale.bill.id, first.bill.id);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_with_unknown_request_id_is_empty_cart() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let result = billing
            .create_invoice(&Cart::new(), details(Some("till-1-0004")))
            .await;

        assert!(matches!(result, Err(ServiceError::EmptyCart)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_sub_basis_point_tax_rate_rejected() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store.clone());

        let mut fine_tax = details(None);
        fine_tax.tax_rate_percent = 12.345;
        let result = billing.create_invoice(&tea_and_cake(), fine_tax).await;

        match result {
            Err(ServiceError::InvalidInput(msg)) => assert!(msg.contains("0.01%"), "{msg}"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bill_timestamps_are_microsecond_precision() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store);

        let outcome = billing
            .create_invoice(&tea_and_cake(), details(None))
            .await
            .unwrap();
        assert_eq!(outcome.bill.created_at.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[tokio::test]
    async fn test_get_and_delete_bill() {
        let store = Arc::new(MemoryBillStore::new());
        let billing = service(store);

        let bill = billing
            .create_invoice(&tea_and_cake(), details(None))
            .await
            .unwrap()
            .bill;

        assert_eq!(billing.get_bill(&bill.id).await.unwrap(), bill);
        assert_eq!(billing.list_bills().await.unwrap().len(), 1);

        billing.delete_bill(&bill.id).await.unwrap();
        assert!(matches!(
            billing.get_bill(&bill.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            billing.delete_bill(&bill.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
