//! # Repository Module
//!
//! Database repository implementations for Till POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler / service                                                │
//! │       │                                                                 │
//! │       │  db.bills().list_between(start, end)                           │
//! │       ▼                                                                 │
//! │  BillRepository                     ItemRepository                     │
//! │  ├── insert(&bill)                  ├── list(category)                 │
//! │  ├── get_by_id(id)                  ├── get_by_id(id)                  │
//! │  ├── get_by_request_id(key)         ├── insert / update / delete       │
//! │  ├── list_all()                     └── categories()                   │
//! │  ├── list_between(start, end)                                          │
//! │  └── delete(id)                                                        │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime (`sqlx::query_as`) and decoded through
//! `FromRow` row structs, then converted into till-core types.

pub mod bill;
pub mod item;

use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};

/// Fixed-width UTC format; lexical order equals time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Encodes a timestamp for a TEXT column, at microsecond precision.
pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn decode_timestamp(entity: &str, id: &str, raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::invalid_data(entity, id, format!("timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format_sorts_lexically() {
        let a = Utc.with_ymd_and_hms(2026, 3, 15, 9, 5, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1);
        let c = a + chrono::Duration::hours(10);

        assert_eq!(encode_timestamp(a), "2026-03-15T09:05:00.000000Z");
        assert!(encode_timestamp(a) < encode_timestamp(b));
        assert!(encode_timestamp(b) < encode_timestamp(c));
    }

    #[test]
    fn test_timestamp_decode() {
        let a = Utc.with_ymd_and_hms(2026, 3, 15, 9, 5, 0).unwrap();
        assert_eq!(decode_timestamp("Bill", "b", &encode_timestamp(a)).unwrap(), a);
        assert!(matches!(
            decode_timestamp("Bill", "b", "yesterday"),
            Err(DbError::InvalidData { .. })
        ));
    }
}
