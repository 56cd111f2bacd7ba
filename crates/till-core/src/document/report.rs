//! Sales report document renderer.

use super::{Block, Column, Document, DocumentKind, DocumentStyle, Field, SummaryLine};
use crate::error::{CoreResult, ValidationError};
use crate::report::SalesReport;
use crate::types::ReportSelector;

fn report_type(selector: &ReportSelector) -> &'static str {
    match selector {
        ReportSelector::Daily => "Today's Sales",
        ReportSelector::DateRange { .. } => "Sales between dates",
        ReportSelector::ByItem { .. } => "Sales of a particular item",
    }
}

/// Lays out an aggregated report.
///
/// The subtitle names the report type. A fields block carries the resolved
/// date range (daily and date-range reports) or the item name (by-item
/// reports). Rows keep the aggregator's order.
pub fn render_report(report: &SalesReport, style: &DocumentStyle) -> CoreResult<Document> {
    let money = |m| style.currency.format(m);

    let mut fields = Vec::with_capacity(2);
    match (&report.selector, report.period) {
        (ReportSelector::ByItem { item_name }, _) => {
            fields.push(Field::new("Selected Item", item_name));
        }
        (_, Some(period)) => {
            fields.push(Field::new(
                "Date Range",
                format!("{} to {}", period.first_day, period.last_day),
            ));
        }
        (_, None) => {}
    }
    fields.push(Field::new("Generated", style.local_timestamp(report.generated_at)));

    let rows = report
        .rows
        .iter()
        .map(|row| {
            vec![
                row.item_name.clone(),
                row.quantity_sold.to_string(),
                money(row.total_sales),
            ]
        })
        .collect();

    let total_sales = report
        .total_sales()
        .ok_or_else(|| ValidationError::overflow("total sales"))?;

    let mut blocks = vec![
        Block::Header {
            title: "Sales Report".to_string(),
            subtitle: Some(format!("Report Type: {}", report_type(&report.selector))),
        },
        Block::Fields { fields },
        Block::Table {
            columns: vec![
                Column::left("Item Name"),
                Column::right("Quantity Sold"),
                Column::right("Total Sales"),
            ],
            rows,
        },
        Block::Summary {
            lines: vec![
                SummaryLine::new("Items Sold", report.total_quantity().to_string()),
                SummaryLine::emphasized("Total Sales", money(total_sales)),
            ],
        },
    ];

    if report.rows.is_empty() {
        blocks.push(Block::Footer {
            text: "No sales for this selection".to_string(),
        });
    }

    Ok(Document {
        kind: DocumentKind::Report,
        title: "Sales Report".to_string(),
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::report::ReportPeriod;
    use crate::types::ReportRow;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn row(name: &str, qty: i64, major: i64) -> ReportRow {
        ReportRow {
            item_name: name.to_string(),
            quantity_sold: qty,
            total_sales: Money::from_major(major),
        }
    }

    fn report(selector: ReportSelector, period: Option<ReportPeriod>) -> SalesReport {
        SalesReport {
            selector,
            period,
            rows: vec![row("Cake", 2, 300), row("Tea", 7, 140)],
            generated_at: Utc.with_ymd_and_hms(2026, 3, 15, 18, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_date_range_report() {
        let first = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let doc = render_report(
            &report(
                ReportSelector::DateRange {
                    start: first,
                    end: last,
                },
                Some(ReportPeriod::new(first, last).unwrap()),
            ),
            &DocumentStyle::default(),
        )
        .unwrap();

        assert_eq!(doc.kind, DocumentKind::Report);
        assert_eq!(
            doc.blocks[0],
            Block::Header {
                title: "Sales Report".to_string(),
                subtitle: Some("Report Type: Sales between dates".to_string()),
            }
        );

        let Block::Fields { fields } = &doc.blocks[1] else {
            panic!("expected fields block");
        };
        assert_eq!(fields[0], Field::new("Date Range", "2026-03-01 to 2026-03-15"));

        let Block::Table { rows, .. } = &doc.blocks[2] else {
            panic!("expected table block");
        };
        assert_eq!(rows[0], ["Cake", "2", "₹300.00"]);
        assert_eq!(rows[1], ["Tea", "7", "₹140.00"]);

        let Block::Summary { lines } = &doc.blocks[3] else {
            panic!("expected summary block");
        };
        assert_eq!(lines[0].value, "9");
        assert_eq!(lines[1], SummaryLine::emphasized("Total Sales", "₹440.00"));
        assert_eq!(doc.blocks.len(), 4);
    }

    #[test]
    fn test_render_by_item_report_names_the_item() {
        let doc = render_report(
            &report(
                ReportSelector::ByItem {
                    item_name: "Tea".to_string(),
                },
                None,
            ),
            &DocumentStyle::default(),
        )
        .unwrap();

        let Block::Fields { fields } = &doc.blocks[1] else {
            panic!("expected fields block");
        };
        assert_eq!(fields[0], Field::new("Selected Item", "Tea"));
    }

    #[test]
    fn test_render_empty_daily_report() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let mut empty = report(ReportSelector::Daily, Some(ReportPeriod::single_day(today)));
        empty.rows.clear();

        let doc = render_report(&empty, &DocumentStyle::default()).unwrap();
        assert!(matches!(
            &doc.blocks[0],
            Block::Header { subtitle: Some(s), .. } if s == "Report Type: Today's Sales"
        ));
        assert!(matches!(doc.blocks.last(), Some(Block::Footer { .. })));
    }
}
