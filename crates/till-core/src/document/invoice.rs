//! Invoice document renderer.

use super::{Block, Column, Document, DocumentKind, DocumentStyle, Field, SummaryLine};
use crate::error::{CoreResult, ValidationError};
use crate::invoice::verify_totals;
use crate::types::Bill;

/// Lays out a finalized bill as an invoice.
///
/// Blocks, in order: header, customer/date fields, line items (bill order),
/// subtotal/tax/total summary, payment method footer.
///
/// ## Errors
/// `TotalsMismatch` if `total - tax` disagrees with the stored subtotal or
/// with the line items. Nothing is rendered in that case.
pub fn render_invoice(bill: &Bill, style: &DocumentStyle) -> CoreResult<Document> {
    let subtotal = verify_totals(bill)?;
    let money = |m| style.currency.format(m);

    let mut rows = Vec::with_capacity(bill.line_items.len());
    for item in &bill.line_items {
        let line_total = item
            .line_total()
            .ok_or_else(|| ValidationError::overflow("line total"))?;
        rows.push(vec![
            item.name.clone(),
            item.quantity.to_string(),
            money(item.unit_price),
            money(line_total),
        ]);
    }

    let blocks = vec![
        Block::Header {
            title: style.store_name.clone(),
            subtitle: Some("Invoice".to_string()),
        },
        Block::Fields {
            fields: vec![
                Field::new("Invoice", &bill.id),
                Field::new("Customer", &bill.customer_name),
                Field::new("Phone", &bill.customer_phone),
                Field::new("Date", style.local_timestamp(bill.created_at)),
            ],
        },
        Block::Table {
            columns: vec![
                Column::left("Item"),
                Column::right("Qty"),
                Column::right("Price"),
                Column::right("Total"),
            ],
            rows,
        },
        Block::Summary {
            lines: vec![
                SummaryLine::new("Subtotal", money(subtotal)),
                SummaryLine::new(format!("Tax ({})", bill.tax_rate), money(bill.tax_amount)),
                SummaryLine::emphasized("Total", money(bill.total_amount)),
            ],
        },
        Block::Footer {
            text: format!("Payment Method: {}", bill.payment_method.label()),
        },
    ];

    Ok(Document {
        kind: DocumentKind::Invoice,
        title: format!("Invoice {}", bill.id),
        blocks,
    })
}
