//! # Reporting Service
//!
//! Loads bills for a report selector and hands them to the aggregator.
//!
//! The store read is narrowed to the selector's UTC window when there is one
//! (Daily, DateRange) and is a full scan for ByItem. The aggregator applies
//! the window again on its own, so a store that over-returns can't skew the
//! rows.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use tracing::{debug, info};

use till_core::report::{aggregate_sales, build_report, selector_window};
use till_core::{Bill, ReportPeriod, ReportRow, ReportSelector, ReportingCalendar, SalesReport};

use super::ports::{timed, BillStore};
use super::ServiceResult;

pub struct ReportingService {
    store: Arc<dyn BillStore>,
    offset: FixedOffset,
    store_timeout: Duration,
}

impl ReportingService {
    /// `offset` is the reference zone that defines where a day starts.
    pub fn new(store: Arc<dyn BillStore>, offset: FixedOffset, store_timeout: Duration) -> Self {
        ReportingService {
            store,
            offset,
            store_timeout,
        }
    }

    fn calendar(&self, now: DateTime<Utc>) -> ReportingCalendar {
        ReportingCalendar::new(self.offset, now)
    }

    /// Aggregated rows for `selector`, as of now.
    pub async fn generate_report(&self, selector: ReportSelector) -> ServiceResult<Vec<ReportRow>> {
        self.generate_report_at(selector, Utc::now()).await
    }

    pub async fn generate_report_at(
        &self,
        selector: ReportSelector,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<ReportRow>> {
        let calendar = self.calendar(now);
        let bills = self.load_bills(&selector, &calendar).await?;
        let rows = aggregate_sales(&bills, &selector, &calendar)?;

        debug!(bills = bills.len(), rows = rows.len(), "Report aggregated");
        Ok(rows)
    }

    /// Rows plus the resolved period and generation time, for documents.
    pub async fn sales_report(&self, selector: ReportSelector) -> ServiceResult<SalesReport> {
        self.sales_report_at(selector, Utc::now()).await
    }

    pub async fn sales_report_at(
        &self,
        selector: ReportSelector,
        now: DateTime<Utc>,
    ) -> ServiceResult<SalesReport> {
        let calendar = self.calendar(now);
        let bills = self.load_bills(&selector, &calendar).await?;
        let report = build_report(&bills, selector, &calendar)?;

        info!(
            rows = report.rows.len(),
            items_sold = report.total_quantity(),
            "Sales report built"
        );
        Ok(report)
    }

    /// Bills created on the calendar days `start..=end` in the reference
    /// zone, oldest first.
    pub async fn bills_between(&self, start: NaiveDate, end: NaiveDate) -> ServiceResult<Vec<Bill>> {
        let calendar = self.calendar(Utc::now());
        let window = calendar.window(ReportPeriod::new(start, end)?)?;

        Ok(timed(
            self.store_timeout,
            "find_by_date_range",
            self.store.find_by_date_range(window.start, window.end),
        )
        .await?)
    }

    /// One store round trip. Invalid selectors fail before any I/O.
    async fn load_bills(
        &self,
        selector: &ReportSelector,
        calendar: &ReportingCalendar,
    ) -> ServiceResult<Vec<Bill>> {
        let bills = match selector_window(selector, calendar)? {
            Some(window) => {
                debug!(start = %window.start, end = %window.end, "Loading bills in window");
                timed(
                    self.store_timeout,
                    "find_by_date_range",
                    self.store.find_by_date_range(window.start, window.end),
                )
                .await?
            }
            None => timed(self.store_timeout, "find_all", self.store.find_all()).await?,
        };
        Ok(bills)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ports::memory::{Fault, MemoryBillStore};
    use crate::services::ServiceError;
    use chrono::{Duration as ChronoDuration, Offset, TimeZone};
    use till_core::{LineItem, Money, PaymentMethod, TaxRate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn tea_bill(id: &str, quantity: i64, created_at: DateTime<Utc>) -> Bill {
        let subtotal = Money::from_major(20 * quantity);
        Bill {
            id: id.to_string(),
            request_id: None,
            customer_name: "Asha".to_string(),
            customer_phone: "9876543210".to_string(),
            line_items: vec![LineItem::new("tea", "Tea", Money::from_major(20), quantity)],
            tax_rate: TaxRate::ZERO,
            tax_amount: Money::zero(),
            subtotal,
            total_amount: subtotal,
            payment_method: PaymentMethod::Cash,
            created_at,
        }
    }

    fn service(store: Arc<MemoryBillStore>) -> ReportingService {
        ReportingService::new(store, Utc.fix(), Duration::from_millis(50))
    }

    fn today_and_yesterday() -> Arc<MemoryBillStore> {
        Arc::new(MemoryBillStore::with_bills(vec![
            tea_bill("today", 2, now() - ChronoDuration::hours(1)),
            tea_bill("yesterday", 5, now() - ChronoDuration::days(1)),
        ]))
    }

    #[tokio::test]
    async fn test_daily_counts_only_today() {
        let reporting = service(today_and_yesterday());

        let rows = reporting
            .generate_report_at(ReportSelector::Daily, now())
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_name, "Tea");
        assert_eq!(rows[0].quantity_sold, 2);
        assert_eq!(rows[0].total_sales, Money::from_major(40));
    }

    #[tokio::test]
    async fn test_by_item_is_all_time() {
        let reporting = service(today_and_yesterday());

        let rows = reporting
            .generate_report_at(
                ReportSelector::ByItem {
                    item_name: "Tea".to_string(),
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(rows[0].quantity_sold, 7);
        assert_eq!(rows[0].total_sales, Money::from_major(140));
    }

    #[tokio::test]
    async fn test_range_of_today_equals_daily() {
        let reporting = service(today_and_yesterday());
        let today = now().date_naive();

        let daily = reporting
            .generate_report_at(ReportSelector::Daily, now())
            .await
            .unwrap();
        let range = reporting
            .generate_report_at(
                ReportSelector::DateRange {
                    start: today,
                    end: today,
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(daily, range);
    }

    #[tokio::test]
    async fn test_inverted_range_fails_before_store() {
        let store = today_and_yesterday();
        let reporting = service(store.clone());
        let today = now().date_naive();

        let result = reporting
            .generate_report_at(
                ReportSelector::DateRange {
                    start: today,
                    end: today - ChronoDuration::days(1),
                },
                now(),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_store_outage_propagates() {
        let reporting = service(Arc::new(MemoryBillStore::with_fault(Fault::Unavailable)));

        let result = reporting
            .generate_report_at(ReportSelector::Daily, now())
            .await;
        assert!(matches!(result, Err(ServiceError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_sales_report_carries_period() {
        let reporting = service(today_and_yesterday());

        let report = reporting
            .sales_report_at(ReportSelector::Daily, now())
            .await
            .unwrap();

        let period = report.period.unwrap();
        assert_eq!(period.first_day, now().date_naive());
        assert_eq!(report.generated_at, now());
        assert_eq!(report.total_quantity(), 2);
    }
}
