//! # Health Check

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

/// 200 when the store answers and its schema is current, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let reachable = state.db.health_check().await;
    let schema = if reachable {
        match state.db.schema_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, "Could not read schema status");
                None
            }
        }
    } else {
        None
    };

    let healthy = schema.is_some_and(|s| s.is_current());
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unhealthy" },
            "database": if reachable { "reachable" } else { "unreachable" },
            "schema": schema,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
