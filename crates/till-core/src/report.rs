//! # Report Aggregator
//!
//! Groups sold line items by item name for a [`ReportSelector`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ReportSelector ──► period() ──► ReportingCalendar::window()           │
//! │        │              Daily      → today ..= today                      │
//! │        │              DateRange  → start ..= end                        │
//! │        │              ByItem     → (all time)                           │
//! │        ▼                                                                │
//! │  bills ──► keep if created_at ∈ window                                  │
//! │        ──► for each line (ByItem: name must match)                      │
//! │        ──► rows[name].quantity += q, rows[name].sales += price × q      │
//! │        ──► rows in first-seen order                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Calendar Days
//! Days are computed in a fixed reference offset, not in UTC. "Today" at
//! 00:30 in UTC+05:30 is still yesterday in UTC, and the window must follow
//! the shop's wall clock. The clock reading (`now`) is passed in so every
//! function here stays pure.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Bill, ReportRow, ReportSelector};
use crate::validation::validate_report_item_name;

// =============================================================================
// Calendar
// =============================================================================

/// A reference offset plus the moment "now", for resolving calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingCalendar {
    offset: FixedOffset,
    now: DateTime<Utc>,
}

impl ReportingCalendar {
    pub fn new(offset: FixedOffset, now: DateTime<Utc>) -> Self {
        Self { offset, now }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Today's date on the shop's wall clock.
    pub fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.offset).date_naive()
    }

    /// Start of `day` in the reference offset, as a UTC instant.
    pub fn start_of_day(&self, day: NaiveDate) -> CoreResult<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&day.and_time(NaiveTime::MIN))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                ValidationError::InvalidFormat {
                    field: "date".to_string(),
                    reason: format!("{day} is outside the supported range"),
                }
                .into()
            })
    }

    /// Converts a day period into a UTC window covering every instant of it.
    pub fn window(&self, period: ReportPeriod) -> CoreResult<DateWindow> {
        let start = self.start_of_day(period.first_day)?;
        let after_last = period.last_day.succ_opt().ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "end date".to_string(),
                reason: format!("{} is outside the supported range", period.last_day),
            }
        })?;
        let end = self.start_of_day(after_last)?;
        Ok(DateWindow { start, end })
    }
}

/// Inclusive range of calendar days in the reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    #[ts(as = "String")]
    pub first_day: NaiveDate,
    #[ts(as = "String")]
    pub last_day: NaiveDate,
}

impl ReportPeriod {
    /// Builds a period, rejecting `first_day > last_day`.
    pub fn new(first_day: NaiveDate, last_day: NaiveDate) -> CoreResult<Self> {
        if first_day > last_day {
            return Err(ValidationError::InvertedRange {
                start: first_day,
                end: last_day,
            }
            .into());
        }
        Ok(Self {
            first_day,
            last_day,
        })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            first_day: day,
            last_day: day,
        }
    }
}

/// Half-open UTC interval `[start, end)`.
///
/// `end` is the first instant of the day after the period, so the window
/// covers the last day up to and including 23:59:59.999….
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

// =============================================================================
// Selector Resolution
// =============================================================================

impl ReportSelector {
    /// Resolves the selector into a calendar period. `ByItem` has none.
    pub fn period(&self, calendar: &ReportingCalendar) -> CoreResult<Option<ReportPeriod>> {
        match self {
            ReportSelector::Daily => Ok(Some(ReportPeriod::single_day(calendar.today()))),
            ReportSelector::DateRange { start, end } => ReportPeriod::new(*start, *end).map(Some),
            ReportSelector::ByItem { item_name } => {
                validate_report_item_name(Some(item_name))?;
                Ok(None)
            }
        }
    }

    /// The item name a `ByItem` selector filters on.
    pub fn item_filter(&self) -> Option<&str> {
        match self {
            ReportSelector::ByItem { item_name } => Some(item_name.trim()),
            _ => None,
        }
    }
}

/// Report kinds as the reports page names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Custom,
    Item,
}

/// Loose report request as sent by the reports page.
///
/// Every field but `kind` is optional on the wire. Converting to a
/// [`ReportSelector`] checks that the fields the kind needs are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub kind: ReportKind,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub item_name: Option<String>,
}

impl TryFrom<ReportQuery> for ReportSelector {
    type Error = ValidationError;

    fn try_from(query: ReportQuery) -> Result<Self, Self::Error> {
        match query.kind {
            ReportKind::Daily => Ok(ReportSelector::Daily),
            ReportKind::Custom => {
                let start = query
                    .start_date
                    .ok_or_else(|| ValidationError::required("start date"))?;
                let end = query
                    .end_date
                    .ok_or_else(|| ValidationError::required("end date"))?;
                if start > end {
                    return Err(ValidationError::InvertedRange { start, end });
                }
                Ok(ReportSelector::DateRange { start, end })
            }
            ReportKind::Item => Ok(ReportSelector::ByItem {
                item_name: validate_report_item_name(query.item_name.as_deref())?,
            }),
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// An aggregated report together with what it was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub selector: ReportSelector,
    pub period: Option<ReportPeriod>,
    pub rows: Vec<ReportRow>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

impl SalesReport {
    pub fn total_quantity(&self) -> i64 {
        self.rows.iter().map(|r| r.quantity_sold).sum()
    }

    pub fn total_sales(&self) -> Option<Money> {
        self.rows
            .iter()
            .try_fold(Money::zero(), |acc, r| acc.checked_add(r.total_sales))
    }
}

/// The UTC window a selector covers, if any. Used by callers to pre-filter
/// bills before aggregation.
pub fn selector_window(
    selector: &ReportSelector,
    calendar: &ReportingCalendar,
) -> CoreResult<Option<DateWindow>> {
    match selector.period(calendar)? {
        Some(period) => calendar.window(period).map(Some),
        None => Ok(None),
    }
}

/// Aggregates bills into one row per item name, in first-seen order.
///
/// The date filter is always applied here, even if the caller already
/// narrowed `bills`.
///
/// ## Errors
/// `InvalidInput` for an inverted date range, a blank item name, or
/// totals that overflow.
pub fn aggregate_sales(
    bills: &[Bill],
    selector: &ReportSelector,
    calendar: &ReportingCalendar,
) -> CoreResult<Vec<ReportRow>> {
    let window = selector_window(selector, calendar)?;
    let item_filter = selector.item_filter();

    let mut rows: Vec<ReportRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let surviving = bills
        .iter()
        .filter(|bill| window.map_or(true, |w| w.contains(bill.created_at)));

    for bill in surviving {
        for line in &bill.line_items {
            if item_filter.is_some_and(|name| name != line.name) {
                continue;
            }

            let sales = line
                .line_total()
                .ok_or_else(|| ValidationError::overflow("total sales"))?;

            let slot = *index.entry(line.name.as_str()).or_insert_with(|| {
                rows.push(ReportRow {
                    item_name: line.name.clone(),
                    quantity_sold: 0,
                    total_sales: Money::zero(),
                });
                rows.len() - 1
            });

            let row = &mut rows[slot];
            row.quantity_sold = row
                .quantity_sold
                .checked_add(line.quantity)
                .ok_or_else(|| ValidationError::overflow("quantity sold"))?;
            row.total_sales = row
                .total_sales
                .checked_add(sales)
                .ok_or_else(|| ValidationError::overflow("total sales"))?;
        }
    }

    Ok(rows)
}

/// Aggregates and keeps the resolved period alongside the rows.
pub fn build_report(
    bills: &[Bill],
    selector: ReportSelector,
    calendar: &ReportingCalendar,
) -> CoreResult<SalesReport> {
    let period = selector.period(calendar)?;
    let rows = aggregate_sales(bills, &selector, calendar)?;
    Ok(SalesReport {
        selector,
        period,
        rows,
        generated_at: calendar.now(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
