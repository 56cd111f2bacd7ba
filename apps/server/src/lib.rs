//! # till-server: HTTP API for Till POS
//!
//! Serves the web frontend: the menu catalog, the register cart, billing,
//! the bills list, sales reports and printing.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP ──► TraceLayer ──► CorsLayer ──► routes/* handler                 │
//! │                                            │                            │
//! │                   ┌────────────────────────┼───────────────────┐        │
//! │                   ▼                        ▼                   ▼        │
//! │            BillingService         ReportingService       PrintService   │
//! │                   │                        │                   │        │
//! │                   └──────► BillStore ◄─────┘             DocumentSink   │
//! │                           (timeout)                       (spool dir)   │
//! │                                                                         │
//! │  Errors flow back as ApiError { code, message } with a status per code │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::ServerConfig;
pub use state::AppState;

/// `/health` at the root, everything else under `/api`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
