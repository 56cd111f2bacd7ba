//! # Cart Routes
//!
//! The register cart and checkout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use till_core::cart::CartView;
use till_core::{Bill, PaymentMethod};

use crate::error::{ApiError, ApiResult};
use crate::services::InvoiceDetails;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// The billing form submitted from the cart page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_phone: String,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub tax_rate_percent: Option<f64>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub bill: Bill,
    pub replayed: bool,
    pub cart: CartView,
}

pub async fn get_cart(State(state): State<AppState>) -> ApiResult<Json<CartView>> {
    Ok(Json(state.cart.view().await?))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(req): Json<AddToCartRequest>,
) -> ApiResult<Json<CartView>> {
    debug!(item_id = %req.item_id, quantity = req.quantity, "add_to_cart");

    let item = state
        .db
        .items()
        .get_by_id(&req.item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item", &req.item_id))?;

    state
        .cart
        .with_cart_mut(|cart| cart.add_item(&item, req.quantity))
        .await?;
    Ok(Json(state.cart.view().await?))
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> ApiResult<Json<CartView>> {
    state
        .cart
        .with_cart_mut(|cart| cart.update_quantity(&item_id, req.quantity))
        .await?;
    Ok(Json(state.cart.view().await?))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<CartView>> {
    state
        .cart
        .with_cart_mut(|cart| cart.remove_item(&item_id))
        .await?;
    Ok(Json(state.cart.view().await?))
}

pub async fn clear_cart(State(state): State<AppState>) -> ApiResult<Json<CartView>> {
    state.cart.with_cart_mut(|cart| cart.clear()).await;
    info!("Cart cleared");
    Ok(Json(state.cart.view().await?))
}

/// Bills the cart. The cart is cleared only if the bill was saved.
pub async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let details = InvoiceDetails {
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        tax_rate_percent: req
            .tax_rate_percent
            .unwrap_or_else(|| state.default_tax_rate.percentage()),
        payment_method: req.payment_method,
        request_id: req.request_id,
    };

    let mut cart = state.cart.lock().await;
    let outcome = state.billing.create_invoice(&cart, details).await?;
    outcome.cart_directive.apply(&mut cart);
    let view = CartView::try_from(&*cart)?;
    drop(cart);

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(CheckoutResponse {
            bill: outcome.bill,
            replayed: outcome.replayed,
            cart: view,
        }),
    ))
}
