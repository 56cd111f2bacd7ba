//! # till-core: Billing & Reporting Engine for Till POS
//!
//! This crate holds the billing and reporting logic of Till POS as pure,
//! synchronous functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web frontend                                 │   │
//! │  │    Items ──► Cart ──► Bill ──► Bills list ──► Reports           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             till-server (routes + services)                     │   │
//! │  │    BillingService, ReportingService, print spool                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  cart   │ │ invoice │ │ report  │ │document │ │  money  │  │   │
//! │  │   │  Cart   │ │ totals  │ │ rollup  │ │ blocks  │ │  Money  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Bill, LineItem, ReportSelector, ...)
//! - [`money`] - Money type with integer arithmetic, currency formatting
//! - [`cart`] - Register cart keyed by item id
//! - [`invoice`] - Invoice calculator and bill finalization
//! - [`report`] - Report selector resolution and sales aggregation
//! - [`document`] - Printable invoice/report documents and text layout
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::invoice::calculate_invoice;
//! use till_core::{LineItem, Money, TaxRate};
//!
//! let items = vec![
//!     LineItem::new("tea", "Tea", Money::from_major(20), 3),
//!     LineItem::new("cake", "Cake", Money::from_major(150), 1),
//! ];
//! let totals = calculate_invoice(&items, TaxRate::from_bps(1000)).unwrap();
//!
//! assert_eq!(totals.subtotal, Money::from_major(210));
//! assert_eq!(totals.tax_amount, Money::from_major(21));
//! assert_eq!(totals.total_amount, Money::from_major(231));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod document;
pub mod error;
pub mod invoice;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartView};
pub use document::{Document, DocumentStyle};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{calculate_invoice, verify_totals, InvoiceRequest, InvoiceTotals};
pub use money::{CurrencyFormat, Money};
pub use report::{
    build_report, DateWindow, ReportKind, ReportPeriod, ReportQuery, ReportingCalendar, SalesReport,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in the cart.
///
/// Catches typos like 1000 for 10 at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;
