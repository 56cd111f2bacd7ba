//! # Invoice Calculator
//!
//! Turns cart lines and a flat tax rate into invoice totals, and finalizes
//! a [`Bill`].
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line_total_i = unit_price_i × quantity_i          (checked i64)       │
//! │  subtotal     = Σ line_total_i                     (checked i64)       │
//! │  tax_amount   = subtotal × bps / 10000             (i128, half away    │
//! │                                                     from zero)         │
//! │  total_amount = subtotal + tax_amount              (checked i64)       │
//! │                                                                         │
//! │  Any overflow → InvalidInput, never a wrapped or saturated amount.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is computed once on the subtotal, not per line, so the subtotal does
//! not depend on line order and `total == subtotal + tax` holds exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Bill, LineItem, PaymentMethod, TaxRate};
use crate::validation::{
    validate_customer_name, validate_customer_phone, validate_request_id,
    validate_unit_price_cents,
};

/// Subtotal, tax and total of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
}

/// Computes invoice totals.
///
/// ## Errors
/// `InvalidInput` when `line_items` is empty, a unit price or quantity is
/// not positive, the rate exceeds 100%, or any sum overflows.
///
/// ## Example
/// ```rust
/// use till_core::invoice::calculate_invoice;
/// use till_core::{LineItem, Money, TaxRate};
///
/// let items = [LineItem::new("tea", "Tea", Money::from_cents(1000), 1)];
/// let totals = calculate_invoice(&items, TaxRate::from_bps(825)).unwrap();
/// assert_eq!(totals.tax_amount.cents(), 83);
/// assert_eq!(totals.total_amount.cents(), 1083);
/// ```
pub fn calculate_invoice(line_items: &[LineItem], tax_rate: TaxRate) -> CoreResult<InvoiceTotals> {
    if line_items.is_empty() {
        return Err(ValidationError::required("line items").into());
    }
    TaxRate::try_from_bps(tax_rate.bps())?;

    let mut subtotal = Money::zero();
    for item in line_items {
        validate_unit_price_cents(item.unit_price.cents())?;
        if item.quantity <= 0 {
            return Err(ValidationError::must_be_positive("quantity").into());
        }

        let line_total = item
            .line_total()
            .ok_or_else(|| ValidationError::overflow("line total"))?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or_else(|| ValidationError::overflow("subtotal"))?;
    }

    let tax_amount = subtotal
        .checked_tax(tax_rate)
        .ok_or_else(|| ValidationError::overflow("tax amount"))?;
    let total_amount = subtotal
        .checked_add(tax_amount)
        .ok_or_else(|| ValidationError::overflow("total amount"))?;

    Ok(InvoiceTotals {
        subtotal,
        tax_amount,
        total_amount,
    })
}

// =============================================================================
// Bill Finalization
// =============================================================================

/// Everything the cashier enters on the billing form, plus the cart lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub tax_rate: TaxRate,
    pub payment_method: PaymentMethod,
    pub line_items: Vec<LineItem>,
    pub request_id: Option<String>,
}

impl InvoiceRequest {
    /// Validates the request and produces the immutable bill.
    ///
    /// `id` and `created_at` come from the caller so this stays pure.
    pub fn finalize(self, id: String, created_at: DateTime<Utc>) -> CoreResult<Bill> {
        if self.line_items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_customer_name(&self.customer_name)?;
        validate_customer_phone(&self.customer_phone)?;
        if let Some(request_id) = &self.request_id {
            validate_request_id(request_id)?;
        }

        let totals = calculate_invoice(&self.line_items, self.tax_rate)?;

        Ok(Bill {
            id,
            request_id: self.request_id,
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            line_items: self.line_items,
            tax_rate: self.tax_rate,
            tax_amount: totals.tax_amount,
            subtotal: totals.subtotal,
            total_amount: totals.total_amount,
            payment_method: self.payment_method,
            created_at,
        })
    }
}

/// Checks a stored bill's amounts against each other.
///
/// The printed subtotal is `total - tax`; it must match the stored
/// subtotal and the line items. Returns the derived subtotal.
pub fn verify_totals(bill: &Bill) -> CoreResult<Money> {
    let derived = bill.total_amount.checked_sub(bill.tax_amount);
    let from_lines = bill.line_items_subtotal();

    match (derived, from_lines) {
        (Some(derived), Some(from_lines))
            if derived == bill.subtotal && from_lines == bill.subtotal =>
        {
            Ok(derived)
        }
        (derived, from_lines) => Err(CoreError::TotalsMismatch {
            bill_id: bill.id.clone(),
            stored: bill.subtotal,
            derived: derived.unwrap_or(Money::zero()),
            from_lines: from_lines.unwrap_or(Money::zero()),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tea(qty: i64) -> LineItem {
        LineItem::new("tea", "Tea", Money::from_major(20), qty)
    }

    fn cake(qty: i64) -> LineItem {
        LineItem::new("cake", "Cake", Money::from_major(150), qty)
    }

    fn request(items: Vec<LineItem>) -> InvoiceRequest {
        InvoiceRequest {
            customer_name: "  Asha ".to_string(),
            customer_phone: "9876543210".to_string(),
            tax_rate: TaxRate::from_bps(1000),
            payment_method: PaymentMethod::Upi,
            line_items: items,
            request_id: None,
        }
    }

    #[test]
    fn test_tea_and_cake_at_ten_percent() {
        let totals = calculate_invoice(&[tea(3), cake(1)], TaxRate::from_bps(1000)).unwrap();
        assert_eq!(totals.subtotal, Money::from_major(210));
        assert_eq!(totals.tax_amount, Money::from_major(21));
        assert_eq!(totals.total_amount, Money::from_major(231));
    }

    #[test]
    fn test_subtotal_independent_of_order() {
        let rate = TaxRate::from_bps(1250);
        let a = calculate_invoice(&[tea(3), cake(1)], rate).unwrap();
        let b = calculate_invoice(&[cake(1), tea(3)], rate).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        for bps in [0, 1, 500, 825, 1800, 2850, 10_000] {
            let items = [
                LineItem::new("a", "A", Money::from_cents(333), 7),
                LineItem::new("b", "B", Money::from_cents(1999), 2),
            ];
            let t = calculate_invoice(&items, TaxRate::from_bps(bps)).unwrap();
            assert_eq!(t.total_amount, t.subtotal + t.tax_amount);
        }
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 0.05 × 10% = 0.005 → 0.01
        let items = [LineItem::new("m", "Mint", Money::from_cents(5), 1)];
        let t = calculate_invoice(&items, TaxRate::from_bps(1000)).unwrap();
        assert_eq!(t.tax_amount.cents(), 1);
    }

    #[test]
    fn test_zero_tax() {
        let t = calculate_invoice(&[tea(1)], TaxRate::ZERO).unwrap();
        assert!(t.tax_amount.is_zero());
        assert_eq!(t.total_amount, t.subtotal);
    }

    #[test]
    fn test_rejects_bad_input() {
        let rate = TaxRate::from_bps(1000);
        assert!(matches!(calculate_invoice(&[], rate), Err(CoreError::InvalidInput(_))));

        let free = LineItem::new("x", "Free", Money::zero(), 1);
        assert!(matches!(calculate_invoice(&[free], rate), Err(CoreError::InvalidInput(_))));

        assert!(matches!(calculate_invoice(&[tea(0)], rate), Err(CoreError::InvalidInput(_))));
        assert!(matches!(calculate_invoice(&[tea(-1)], rate), Err(CoreError::InvalidInput(_))));

        assert!(matches!(
            calculate_invoice(&[tea(1)], TaxRate::from_bps(10_001)),
            Err(CoreError::InvalidInput(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_overflow_is_invalid_input() {
        let huge = LineItem::new("gold", "Gold", Money::from_cents(i64::MAX / 2), 3);
        assert!(matches!(
            calculate_invoice(&[huge], TaxRate::ZERO),
            Err(CoreError::InvalidInput(ValidationError::Overflow { .. }))
        ));

        let big = LineItem::new("gold", "Gold", Money::from_cents(i64::MAX - 10), 1);
        assert!(matches!(
            calculate_invoice(&[big], TaxRate::from_bps(1000)),
            Err(CoreError::InvalidInput(ValidationError::Overflow { .. }))
        ));
    }

    #[test]
    fn test_finalize_builds_consistent_bill() {
        let now = Utc::now();
        let bill = request(vec![tea(3), cake(1)])
            .finalize("bill-1".to_string(), now)
            .unwrap();

        assert_eq!(bill.customer_name, "Asha");
        assert_eq!(bill.total_amount, Money::from_major(231));
        assert_eq!(bill.created_at, now);
        assert_eq!(verify_totals(&bill).unwrap(), Money::from_major(210));
    }

    #[test]
    fn test_finalize_rejects_empty_and_bad_customer() {
        let now = Utc::now();
        assert!(matches!(
            request(vec![]).finalize("b".to_string(), now),
            Err(CoreError::EmptyCart)
        ));

        let mut bad_phone = request(vec![tea(1)]);
        bad_phone.customer_phone = "call me".to_string();
        assert!(matches!(
            bad_phone.finalize("b".to_string(), now),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_verify_totals_detects_mismatch() {
        let mut bill = request(vec![tea(3)])
            .finalize("bill-2".to_string(), Utc::now())
            .unwrap();
        bill.tax_amount = bill.tax_amount + Money::from_cents(1);

        assert!(matches!(
            verify_totals(&bill),
            Err(CoreError::TotalsMismatch { ref bill_id, .. }) if bill_id == "bill-2"
        ));
    }
}
