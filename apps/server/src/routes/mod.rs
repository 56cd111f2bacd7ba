//! # HTTP Routes
//!
//! ```text
//! GET    /health
//!
//! GET    /api/items?category=        list (optionally one category)
//! POST   /api/items                  create
//! GET    /api/items/categories       distinct categories
//! GET    /api/items/{id}             get
//! PUT    /api/items/{id}             update
//! DELETE /api/items/{id}             delete
//!
//! GET    /api/cart                   current register cart
//! DELETE /api/cart                   clear (cancel)
//! POST   /api/cart/items             add catalog item
//! PUT    /api/cart/items/{item_id}   set quantity (0 removes)
//! DELETE /api/cart/items/{item_id}   remove
//! POST   /api/cart/checkout          bill the cart, clear on success
//!
//! GET    /api/bills                  all bills, newest first
//! POST   /api/bills                  create from explicit cart items
//! GET    /api/bills/date-range       ?startDate=&endDate= (inclusive)
//! GET    /api/bills/{id}
//! DELETE /api/bills/{id}
//! GET    /api/bills/{id}/document    invoice document (JSON)
//! POST   /api/bills/{id}/print       invoice to the print spool
//!
//! POST   /api/reports                rows
//! POST   /api/reports/document       report document (JSON)
//! POST   /api/reports/print          report to the print spool
//! ```

pub mod bills;
pub mod cart;
pub mod health;
pub mod items;
pub mod reports;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Routes under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/categories", get(items::list_categories))
        .route(
            "/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_to_cart))
        .route(
            "/cart/items/{item_id}",
            put(cart::update_cart_item).delete(cart::remove_from_cart),
        )
        .route("/cart/checkout", post(cart::checkout))
        .route("/bills", get(bills::list_bills).post(bills::create_bill))
        .route("/bills/date-range", get(bills::bills_by_date_range))
        .route("/bills/{id}", get(bills::get_bill).delete(bills::delete_bill))
        .route("/bills/{id}/document", get(bills::bill_document))
        .route("/bills/{id}/print", post(bills::print_bill))
        .route("/reports", post(reports::generate_report))
        .route("/reports/document", post(reports::report_document))
        .route("/reports/print", post(reports::print_report))
}
