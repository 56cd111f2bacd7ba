//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied in filename order when the pool opens.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   items, bills (+ request_id unique index)
//!
//! Database::new ──► MIGRATOR.run ──► _sqlx_migrations bookkeeping
//!                                    (one row per applied file)
//! ```
//!
//! Applied files are checksummed by sqlx, so an edited migration fails
//! startup. Schema changes go in a new `NNN_description.sql`.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far the connected database is behind the compiled-in schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
    /// Migrations compiled into this build.
    pub known: usize,
    /// Migrations recorded as applied in the database.
    pub applied: usize,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

pub(crate) async fn apply(pool: &SqlitePool) -> DbResult<()> {
    debug!(known = MIGRATOR.migrations.len(), "Applying schema migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema is up to date");
    Ok(())
}

pub(crate) async fn status(pool: &SqlitePool) -> DbResult<SchemaStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(SchemaStatus {
        known: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}
