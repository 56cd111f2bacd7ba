//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │    LineItem     │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  item_id        │──►│  id (UUID)      │       │
//! │  │  name           │   │  name (frozen)  │   │  line_items     │       │
//! │  │  price          │   │  unit_price     │   │  subtotal       │       │
//! │  │  category       │   │  quantity       │   │  tax / total    │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │    TaxRate      │   │ PaymentMethod   │   │   ReportRow     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Cash           │   │  item_name      │       │
//! │  │  1000 = 10%     │   │  Card           │   │  quantity_sold  │       │
//! │  └─────────────────┘   │  Upi            │   │  total_sales    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `LineItem` copies the catalog name and price when it enters the cart.
//! Later catalog edits never change a finalized bill.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::ValidationResult;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10%. The valid range is 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

/// Largest float error accepted when scaling a percentage to basis points.
const BPS_TOLERANCE: f64 = 1e-6;

impl TaxRate {
    pub const ZERO: TaxRate = TaxRate(0);

    /// 100%, the highest accepted rate.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a tax rate from basis points without range checks.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage typed by a cashier.
    ///
    /// Accepts finite values in `[0, 100]` with at most two decimal places.
    /// Finer rates are rejected rather than rounded, so the billed tax is
    /// always exactly `subtotal × pct / 100`. This is the only place a float
    /// enters the billing path.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::try_from_percentage(8.25).unwrap().bps(), 825);
    /// assert!(TaxRate::try_from_percentage(12.345).is_err());
    /// assert!(TaxRate::try_from_percentage(101.0).is_err());
    /// assert!(TaxRate::try_from_percentage(f64::NAN).is_err());
    /// ```
    pub fn try_from_percentage(pct: f64) -> ValidationResult<Self> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "tax rate percent".to_string(),
                min: 0,
                max: 100,
            });
        }

        // 12.34 * 100.0 == 1233.9999999999998; tolerate representation
        // error only, not a third decimal.
        let scaled = pct * 100.0;
        let bps = scaled.round();
        if (scaled - bps).abs() > BPS_TOLERANCE {
            return Err(ValidationError::InvalidFormat {
                field: "tax rate percent".to_string(),
                reason: "supports at most two decimal places (0.01% precision)".to_string(),
            });
        }
        Ok(TaxRate(bps as u32))
    }

    /// Checks a raw basis point value against the valid range.
    pub fn try_from_bps(bps: u32) -> ValidationResult<Self> {
        if bps > Self::MAX_BPS {
            return Err(ValidationError::OutOfRange {
                field: "tax rate".to_string(),
                min: 0,
                max: Self::MAX_BPS as i64,
            });
        }
        Ok(TaxRate(bps))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// `10%`, `8.25%`, `7.5%`.
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid. Exactly one per bill.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Upi];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }

    /// Label printed on invoices.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: Self::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// An item on the menu, as managed on the items page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    /// Image URL or path, shown on the item card.
    pub image: Option<String>,
    pub category: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One row of a cart or a finalized bill.
///
/// `name` and `unit_price` are frozen from the catalog when the item is
/// added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(
        item_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Snapshots a catalog item at the given quantity.
    pub fn from_catalog(item: &CatalogItem, quantity: i64) -> Self {
        Self::new(item.id.clone(), item.name.clone(), item.price, quantity)
    }

    /// `unit_price × quantity`, or `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul_quantity(self.quantity)
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A finalized invoice. Written once, never mutated.
///
/// ## Invariants
/// - `total_amount == subtotal + tax_amount`
/// - `subtotal == Σ unit_price × quantity` over `line_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    /// Client-supplied key that makes invoice creation idempotent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub line_items: Vec<LineItem>,
    #[serde(rename = "taxRateBps")]
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub subtotal: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Sum of the line items, or `None` on overflow.
    pub fn line_items_subtotal(&self) -> Option<Money> {
        self.line_items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.line_total()?))
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Which bills a report covers.
///
/// ```text
/// Daily              today in the reference zone
/// DateRange{s, e}    s 00:00:00 ..= e 23:59:59.999…, s ≤ e
/// ByItem{name}       every bill ever, only lines named `name`
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSelector {
    Daily,
    #[serde(rename_all = "camelCase")]
    DateRange {
        #[ts(as = "String")]
        start: NaiveDate,
        #[ts(as = "String")]
        end: NaiveDate,
    },
    #[serde(rename_all = "camelCase")]
    ByItem { item_name: String },
}

/// One line of a sales report: everything sold under one item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub item_name: String,
    pub quantity_sold: i64,
    pub total_sales: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::try_from_percentage(10.0).unwrap().bps(), 1000);
        assert_eq!(TaxRate::try_from_percentage(8.25).unwrap().bps(), 825);
        assert_eq!(TaxRate::try_from_percentage(0.0).unwrap(), TaxRate::ZERO);
        assert_eq!(TaxRate::try_from_percentage(100.0).unwrap().bps(), 10_000);
        assert_eq!(TaxRate::try_from_percentage(12.34).unwrap().bps(), 1234);
        assert_eq!(TaxRate::try_from_percentage(0.01).unwrap().bps(), 1);
    }

    #[test]
    fn test_tax_rate_rejects_sub_basis_point_precision() {
        for pct in [12.345, 0.004, 7.125, 99.999] {
            let err = TaxRate::try_from_percentage(pct).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidFormat { .. }),
                "{pct} gave {err:?}"
            );
            assert!(err.to_string().contains("0.01%"));
        }
    }

    #[test]
    fn test_tax_rate_rejects_out_of_range() {
        assert!(TaxRate::try_from_percentage(-0.5).is_err());
        assert!(TaxRate::try_from_percentage(100.01).is_err());
        assert!(TaxRate::try_from_percentage(f64::INFINITY).is_err());
        assert!(TaxRate::try_from_percentage(f64::NAN).is_err());
        assert!(TaxRate::try_from_bps(10_001).is_err());
        assert!(TaxRate::try_from_bps(10_000).is_ok());
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_bps(1000).to_string(), "10%");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(TaxRate::from_bps(750).to_string(), "7.5%");
        assert_eq!(TaxRate::ZERO.to_string(), "0%");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(" UPI ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::Upi.label(), "UPI");
    }

    #[test]
    fn test_payment_method_serde_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Card).unwrap();
        assert_eq!(json, "\"card\"");
    }

    #[test]
    fn test_line_total_overflow() {
        let item = LineItem::new("tea", "Tea", Money::from_major(20), 3);
        assert_eq!(item.line_total(), Some(Money::from_major(60)));

        let huge = LineItem::new("x", "X", Money::from_cents(i64::MAX), 2);
        assert_eq!(huge.line_total(), None);
    }

    #[test]
    fn test_report_selector_json_shape() {
        let selector: ReportSelector = serde_json::from_str(
            r#"{"kind":"date_range","start":"2026-03-01","end":"2026-03-31"}"#,
        )
        .unwrap();
        assert!(matches!(selector, ReportSelector::DateRange { .. }));

        let selector: ReportSelector =
            serde_json::from_str(r#"{"kind":"by_item","itemName":"Tea"}"#).unwrap();
        assert_eq!(
            selector,
            ReportSelector::ByItem {
                item_name: "Tea".to_string()
            }
        );
    }

    #[test]
    fn test_bill_json_uses_camel_case() {
        let bill = Bill {
            id: "b1".to_string(),
            request_id: None,
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            line_items: vec![LineItem::new("tea", "Tea", Money::from_major(20), 1)],
            tax_rate: TaxRate::from_bps(1000),
            tax_amount: Money::from_major(2),
            subtotal: Money::from_major(20),
            total_amount: Money::from_major(22),
            payment_method: PaymentMethod::Cash,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&bill).unwrap();
        assert_eq!(value["totalAmount"], 2200);
        assert_eq!(value["taxRateBps"], 1000);
        assert_eq!(value["lineItems"][0]["unitPrice"], 2000);
        assert!(value.get("requestId").is_none());
        assert_eq!(bill.line_items_subtotal(), Some(Money::from_major(20)));
    }
}
