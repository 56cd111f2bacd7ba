//! # Store Ports
//!
//! The services reach bill storage only through [`BillStore`].
//!
//! ```text
//! ┌──────────────────┐        ┌─────────────┐        ┌──────────────────┐
//! │  BillingService  │──────► │  BillStore  │ ◄───── │  BillRepository  │
//! │ ReportingService │  dyn   │   (trait)   │  impl  │   (till-db)      │
//! └──────────────────┘        └─────────────┘        └──────────────────┘
//! ```
//!
//! Every call goes through [`timed`], so a store that stops answering shows
//! up as [`StoreError::Unavailable`] instead of hanging a request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use till_core::Bill;
use till_db::{BillRepository, DbError};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached in time (busy, closed, timed out).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness rule rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store operation failed: {0}")]
    Failure(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if matches!(err, DbError::UniqueViolation { .. }) {
            StoreError::Conflict(err.to_string())
        } else if err.is_unavailable() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Failure(err.to_string())
        }
    }
}

/// Persistence port for finalized bills.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Persists a bill and returns it as stored.
    async fn save(&self, bill: Bill) -> StoreResult<Bill>;

    /// Bills with `start <= created_at < end`.
    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Bill>>;

    /// All bills, newest first.
    async fn find_all(&self) -> StoreResult<Vec<Bill>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Bill>>;

    async fn find_by_request_id(&self, request_id: &str) -> StoreResult<Option<Bill>>;

    /// Returns false if no bill had that id.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
impl BillStore for BillRepository {
    async fn save(&self, bill: Bill) -> StoreResult<Bill> {
        self.insert(&bill).await?;
        Ok(bill)
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<Bill>> {
        Ok(self.list_between(start, end).await?)
    }

    async fn find_all(&self) -> StoreResult<Vec<Bill>> {
        Ok(self.list_all().await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Bill>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_by_request_id(&self, request_id: &str) -> StoreResult<Option<Bill>> {
        Ok(self.get_by_request_id(request_id).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(BillRepository::delete(self, id).await?)
    }
}

/// Runs one store call under `limit`.
pub async fn timed<T, F>(limit: Duration, operation: &'static str, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let limit_ms = limit.as_millis() as u64;
            warn!(operation, limit_ms, "Bill store call timed out");
            Err(StoreError::Unavailable(format!(
                "{operation} timed out after {limit_ms}ms"
            )))
        }
    }
}

// =============================================================================
// In-memory store for service tests
// =============================================================================

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// How the fake should misbehave.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Fault {
        None,
        FailWrites,
        Unavailable,
        Hang,
    }

    pub struct MemoryBillStore {
        bills: Mutex<Vec<Bill>>,
        fault: Fault,
        calls: AtomicUsize,
    }

    impl MemoryBillStore {
        pub fn new() -> Self {
            Self::with_fault(Fault::None)
        }

        pub fn with_fault(fault: Fault) -> Self {
            MemoryBillStore {
                bills: Mutex::new(Vec::new()),
                fault,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_bills(bills: Vec<Bill>) -> Self {
            MemoryBillStore {
                bills: Mutex::new(bills),
                fault: Fault::None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub async fn len(&self) -> usize {
            self.bills.lock().await.len()
        }

        async fn enter(&self, write: bool) -> StoreResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fault {
                Fault::None => Ok(()),
                Fault::FailWrites if write => Err(StoreError::Failure("disk full".into())),
                Fault::FailWrites => Ok(()),
                Fault::Unavailable => Err(StoreError::Unavailable("offline".into())),
                Fault::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
            }
        }
    }

    #[async_trait]
    impl BillStore for MemoryBillStore {
        async fn save(&self, bill: Bill) -> StoreResult<Bill> {
            self.enter(true).await?;
            let mut bills = self.bills.lock().await;
            if let Some(key) = &bill.request_id {
                if bills.iter().any(|b| b.request_id.as_ref() == Some(key)) {
                    return Err(StoreError::Conflict(format!("request id {key}")));
                }
            }
            bills.push(bill.clone());
            Ok(bill)
        }

        async fn find_by_date_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> StoreResult<Vec<Bill>> {
            self.enter(false).await?;
            let bills = self.bills.lock().await;
            Ok(bills
                .iter()
                .filter(|b| start <= b.created_at && b.created_at < end)
                .cloned()
                .collect())
        }

        async fn find_all(&self) -> StoreResult<Vec<Bill>> {
            self.enter(false).await?;
            let mut bills = self.bills.lock().await.clone();
            bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(bills)
        }

        async fn find_by_id(&self, id: &str) -> StoreResult<Option<Bill>> {
            self.enter(false).await?;
            let bills = self.bills.lock().await;
            Ok(bills.iter().find(|b| b.id == id).cloned())
        }

        async fn find_by_request_id(&self, request_id: &str) -> StoreResult<Option<Bill>> {
            self.enter(false).await?;
            let bills = self.bills.lock().await;
            Ok(bills
                .iter()
                .find(|b| b.request_id.as_deref() == Some(request_id))
                .cloned())
        }

        async fn delete(&self, id: &str) -> StoreResult<bool> {
            self.enter(true).await?;
            let mut bills = self.bills.lock().await;
            let before = bills.len();
            bills.retain(|b| b.id != id);
            Ok(bills.len() != before)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_store_errors() {
        assert!(matches!(
            StoreError::from(DbError::duplicate("request_id", "r1")),
            StoreError::Conflict(_)
        ));
        assert!(matches!(
            StoreError::from(DbError::Busy("database is locked".into())),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(DbError::QueryFailed("syntax".into())),
            StoreError::Failure(_)
        ));
    }

    #[tokio::test]
    async fn test_timed_reports_unavailable_on_timeout() {
        let result: StoreResult<()> = timed(Duration::from_millis(10), "find_all", async {
            std::future::pending::<()>().await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_timed_passes_result_through() {
        let result = timed(Duration::from_secs(1), "find_all", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
