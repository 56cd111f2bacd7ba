//! # Report Routes
//!
//! All three endpoints take the reports page form:
//! ```json
//! { "kind": "custom", "startDate": "2026-03-01", "endDate": "2026-03-15" }
//! { "kind": "item", "itemName": "Tea" }
//! { "kind": "daily" }
//! ```

use axum::extract::State;
use axum::Json;
use tracing::debug;

use till_core::{Document, ReportQuery, ReportRow, ReportSelector};

use crate::error::ApiResult;
use crate::services::PrintJob;
use crate::state::AppState;

fn selector(query: ReportQuery) -> ApiResult<ReportSelector> {
    let selector = ReportSelector::try_from(query)?;
    debug!(?selector, "Report requested");
    Ok(selector)
}

pub async fn generate_report(
    State(state): State<AppState>,
    Json(query): Json<ReportQuery>,
) -> ApiResult<Json<Vec<ReportRow>>> {
    let rows = state.reporting.generate_report(selector(query)?).await?;
    Ok(Json(rows))
}

pub async fn report_document(
    State(state): State<AppState>,
    Json(query): Json<ReportQuery>,
) -> ApiResult<Json<Document>> {
    let report = state.reporting.sales_report(selector(query)?).await?;
    Ok(Json(state.printing.report_document(&report)?))
}

pub async fn print_report(
    State(state): State<AppState>,
    Json(query): Json<ReportQuery>,
) -> ApiResult<Json<PrintJob>> {
    let report = state.reporting.sales_report(selector(query)?).await?;
    Ok(Json(state.printing.print_report(&report).await?))
}
