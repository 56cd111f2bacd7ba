//! # Bill Routes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use till_core::{Bill, Cart, Document, LineItem, PaymentMethod};

use crate::error::ApiResult;
use crate::services::{InvoiceDetails, PrintJob};
use crate::state::AppState;

/// Invoice creation with the cart sent in the body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub tax_rate_percent: Option<f64>,
    pub payment_method: PaymentMethod,
    pub cart_items: Vec<LineItem>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn create_bill(
    State(state): State<AppState>,
    Json(req): Json<CreateBillRequest>,
) -> ApiResult<(StatusCode, Json<Bill>)> {
    // Duplicate item ids are merged by quantity
    let cart = Cart::from_line_items(req.cart_items)?;

    let details = InvoiceDetails {
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        tax_rate_percent: req
            .tax_rate_percent
            .unwrap_or_else(|| state.default_tax_rate.percentage()),
        payment_method: req.payment_method,
        request_id: req.request_id,
    };
    let outcome = state.billing.create_invoice(&cart, details).await?;

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome.bill)))
}

pub async fn list_bills(State(state): State<AppState>) -> ApiResult<Json<Vec<Bill>>> {
    Ok(Json(state.billing.list_bills().await?))
}

pub async fn bills_by_date_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<Bill>>> {
    debug!(start = %range.start_date, end = %range.end_date, "bills_by_date_range");
    Ok(Json(
        state
            .reporting
            .bills_between(range.start_date, range.end_date)
            .await?,
    ))
}

pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Bill>> {
    Ok(Json(state.billing.get_bill(&id).await?))
}

pub async fn delete_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.billing.delete_bill(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bill_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let bill = state.billing.get_bill(&id).await?;
    Ok(Json(state.printing.invoice_document(&bill)?))
}

pub async fn print_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PrintJob>> {
    let bill = state.billing.get_bill(&id).await?;
    Ok(Json(state.printing.print_invoice(&bill).await?))
}
