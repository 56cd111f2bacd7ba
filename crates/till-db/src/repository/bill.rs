//! # Bill Repository
//!
//! Database operations for finalized bills.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bills                                                                  │
//! │  ──────────────────────────────────────────────────────────────────     │
//! │  id │ request_id │ customer_* │ line_items (JSON) │ *_cents │ created_at│
//! │                                                                         │
//! │  One row per bill. Line items are a JSON snapshot, so a bill reads      │
//! │  back exactly as it was written, whatever happened to the catalog.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bills are insert-only. There is no update path.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_timestamp, encode_timestamp};
use till_core::{Bill, LineItem, Money, PaymentMethod, TaxRate};

const BILL_COLUMNS: &str = "id, request_id, customer_name, customer_phone, line_items, \
     tax_rate_bps, tax_cents, subtotal_cents, total_cents, payment_method, created_at";

/// A `bills` row as stored.
#[derive(Debug, FromRow)]
struct BillRow {
    id: String,
    request_id: Option<String>,
    customer_name: String,
    customer_phone: String,
    line_items: String,
    tax_rate_bps: i64,
    tax_cents: i64,
    subtotal_cents: i64,
    total_cents: i64,
    payment_method: PaymentMethod,
    created_at: String,
}

impl TryFrom<BillRow> for Bill {
    type Error = DbError;

    fn try_from(row: BillRow) -> DbResult<Self> {
        let line_items: Vec<LineItem> = serde_json::from_str(&row.line_items)
            .map_err(|e| DbError::invalid_data("Bill", &row.id, format!("line items: {e}")))?;

        let tax_rate = u32::try_from(row.tax_rate_bps)
            .ok()
            .and_then(|bps| TaxRate::try_from_bps(bps).ok())
            .ok_or_else(|| {
                DbError::invalid_data("Bill", &row.id, format!("tax rate {}", row.tax_rate_bps))
            })?;

        let created_at = decode_timestamp("Bill", &row.id, &row.created_at)?;

        Ok(Bill {
            id: row.id,
            request_id: row.request_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            line_items,
            tax_rate,
            tax_amount: Money::from_cents(row.tax_cents),
            subtotal: Money::from_cents(row.subtotal_cents),
            total_amount: Money::from_cents(row.total_cents),
            payment_method: row.payment_method,
            created_at,
        })
    }
}

fn into_bills(rows: Vec<BillRow>) -> DbResult<Vec<Bill>> {
    rows.into_iter().map(Bill::try_from).collect()
}

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Inserts a finalized bill.
    ///
    /// ## Errors
    /// - `UniqueViolation` if the id or the request id already exists
    /// - `CheckViolation` if the totals don't add up
    pub async fn insert(&self, bill: &Bill) -> DbResult<()> {
        debug!(
            bill_id = %bill.id,
            items = bill.line_items.len(),
            total_cents = bill.total_amount.cents(),
            "Inserting bill"
        );

        let line_items = serde_json::to_string(&bill.line_items)
            .map_err(|e| DbError::Internal(format!("encoding line items: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, request_id, customer_name, customer_phone, line_items,
                tax_rate_bps, tax_cents, subtotal_cents, total_cents,
                payment_method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.request_id)
        .bind(&bill.customer_name)
        .bind(&bill.customer_phone)
        .bind(line_items)
        .bind(i64::from(bill.tax_rate.bps()))
        .bind(bill.tax_amount.cents())
        .bind(bill.subtotal.cents())
        .bind(bill.total_amount.cents())
        .bind(bill.payment_method)
        .bind(encode_timestamp(bill.created_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");
        let row: Option<BillRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Bill::try_from).transpose()
    }

    /// Looks up the bill created for an idempotency key.
    pub async fn get_by_request_id(&self, request_id: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE request_id = ?1");
        let row: Option<BillRow> = sqlx::query_as(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Bill::try_from).transpose()
    }

    /// All bills, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills ORDER BY created_at DESC, id");
        let rows: Vec<BillRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Listed bills");
        into_bills(rows)
    }

    /// Bills with `start <= created_at < end`, oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Bill>> {
        let sql = format!(
            "SELECT {BILL_COLUMNS} FROM bills \
             WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at ASC, id"
        );
        let rows: Vec<BillRow> = sqlx::query_as(&sql)
            .bind(encode_timestamp(start))
            .bind(encode_timestamp(end))
            .fetch_all(&self.pool)
            .await?;

        debug!(
            start = %start,
            end = %end,
            count = rows.len(),
            "Listed bills in range"
        );
        into_bills(rows)
    }

    /// Deletes a bill. Returns false if no bill had that id.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM bills WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        debug!(bill_id = %id, deleted, "Deleted bill");
        Ok(deleted)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
