//! # Application State
//!
//! Everything a handler can reach, cloned cheaply into each request.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              AppState                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────┐              │
//! │  │   Database   │  │ BillingService   │  │  CartState   │              │
//! │  │ (items CRUD, │  │ ReportingService │  │ Arc<Mutex<   │              │
//! │  │  health)     │  │ PrintService     │  │   Cart>>     │              │
//! │  └──────────────┘  └────────┬─────────┘  └──────────────┘              │
//! │                             │ Arc<dyn BillStore>                        │
//! │                             ▼                                           │
//! │                      BillRepository (SQLite)                            │
//! │                                                                         │
//! │  ServerConfig: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

pub use cart::CartState;

use std::sync::Arc;

use till_core::TaxRate;
use till_db::Database;

use crate::config::{ConfigError, ServerConfig};
use crate::services::{
    BillStore, BillingService, DocumentSink, PrintService, ReportingService, SpoolSink,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub billing: Arc<BillingService>,
    pub reporting: Arc<ReportingService>,
    pub printing: Arc<PrintService>,
    pub cart: CartState,
    pub config: Arc<ServerConfig>,
    /// Applied at checkout when the cashier leaves tax blank.
    pub default_tax_rate: TaxRate,
}

impl AppState {
    /// Wires the services against `db`, printing into the configured spool
    /// directory.
    pub fn new(config: ServerConfig, db: Database) -> Result<Self, ConfigError> {
        let sink = Arc::new(SpoolSink::new(config.printing.spool_dir.clone()));
        Self::with_sink(config, db, sink)
    }

    /// Same, with documents going to `sink` instead of the spool directory.
    pub fn with_sink(
        config: ServerConfig,
        db: Database,
        sink: Arc<dyn DocumentSink>,
    ) -> Result<Self, ConfigError> {
        let store: Arc<dyn BillStore> = Arc::new(db.bills());
        Self::with_components(config, db, store, sink)
    }

    /// Full wiring. Bills go through `store`; `db` still serves the catalog
    /// and the health check.
    pub fn with_components(
        config: ServerConfig,
        db: Database,
        store: Arc<dyn BillStore>,
        sink: Arc<dyn DocumentSink>,
    ) -> Result<Self, ConfigError> {
        let timeout = config.store.timeout();

        let billing = BillingService::new(store.clone(), timeout);
        let reporting = ReportingService::new(store, config.reporting.offset()?, timeout);
        let printing = PrintService::new(sink, config.document_style()?, config.printing.paper_width);
        let default_tax_rate = config.default_tax_rate()?;

        Ok(AppState {
            db,
            billing: Arc::new(billing),
            reporting: Arc::new(reporting),
            printing: Arc::new(printing),
            cart: CartState::new(),
            config: Arc::new(config),
            default_tax_rate,
        })
    }
}
