//! # Printable Documents
//!
//! A display-agnostic model of what gets printed: invoices and sales
//! reports are built as an ordered list of [`Block`]s. The web frontend
//! renders the JSON form; [`text::render_text`] lays the same document out
//! for a receipt printer.
//!
//! ## Document Shape
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Header   "Chai Point" / "Invoice"        │
//! │ Fields   Invoice: …  Customer: …  Date: … │
//! │ Table    Item | Qty | Price | Total      │
//! │ Summary  Subtotal / Tax (10%) / Total    │
//! │ Footer   Payment Method: UPI             │
//! └──────────────────────────────────────────┘
//! ```

pub mod invoice;
pub mod report;
pub mod text;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::CurrencyFormat;

pub use invoice::render_invoice;
pub use report::render_report;
pub use text::render_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub kind: DocumentKind,
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        title: String,
        subtitle: Option<String>,
    },
    Fields {
        fields: Vec<Field>,
    },
    Table {
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    },
    Summary {
        lines: Vec<SummaryLine>,
    },
    Footer {
        text: String,
    },
}

/// A labelled value such as `Customer: Asha`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Left,
        }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Right,
        }
    }
}

/// One `label ....... value` line under a table. `emphasis` marks the
/// grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
    pub emphasis: bool,
}

impl SummaryLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            emphasis: false,
        }
    }

    pub fn emphasized(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            emphasis: true,
            ..Self::new(label, value)
        }
    }
}

/// Shop-level settings every renderer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStyle {
    pub store_name: String,
    pub currency: CurrencyFormat,
    /// Offset used to print timestamps on the shop's wall clock.
    pub offset: FixedOffset,
}

impl DocumentStyle {
    pub(crate) fn local_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            store_name: "Till POS".to_string(),
            currency: CurrencyFormat::default(),
            offset: Utc.fix(),
        }
    }
}
