//! # Plain-Text Layout
//!
//! Lays a [`Document`] out for a fixed-width receipt printer.
//!
//! ```text
//!            Chai Point
//!             Invoice
//! ================================
//! Invoice: inv-42
//! Customer: Asha
//! --------------------------------
//! Item       Qty    Price    Total
//! --------------------------------
//! Tea          3   ₹20.00   ₹60.00
//! --------------------------------
//! Subtotal                 ₹210.00
//! Tax (10%)                 ₹21.00
//! ================================
//! Total                    ₹231.00
//! ```
//!
//! Widths are counted in chars. Item names too long for the first column
//! get a line of their own, with the numbers on the next line.

use super::{Align, Block, Column, Document};

/// Narrowest paper we lay out for (58mm printers).
pub const MIN_PAPER_WIDTH: usize = 24;

/// Renders `doc` at `width` characters per line.
///
/// Widths below [`MIN_PAPER_WIDTH`] are raised to it.
pub fn render_text(doc: &Document, width: usize) -> String {
    let width = width.max(MIN_PAPER_WIDTH);
    let mut out = Vec::new();

    for block in &doc.blocks {
        match block {
            Block::Header { title, subtitle } => {
                out.push(center(title, width));
                if let Some(subtitle) = subtitle {
                    out.push(center(subtitle, width));
                }
                out.push("=".repeat(width));
            }
            Block::Fields { fields } => {
                for field in fields {
                    out.push(format!("{}: {}", field.label, field.value));
                }
            }
            Block::Table { columns, rows } => layout_table(&mut out, columns, rows, width),
            Block::Summary { lines } => {
                for line in lines {
                    if line.emphasis {
                        out.push("=".repeat(width));
                    }
                    out.push(spread(&line.label, &line.value, width));
                }
            }
            Block::Footer { text } => {
                out.push("-".repeat(width));
                out.push(center(text, width));
            }
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn layout_table(out: &mut Vec<String>, columns: &[Column], rows: &[Vec<String>], width: usize) {
    if columns.is_empty() {
        return;
    }

    // Every column after the first is sized to its widest cell.
    let fixed: Vec<usize> = (1..columns.len())
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|s| char_len(s))
                .chain(std::iter::once(char_len(&columns[c].header)))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let used: usize = fixed.iter().map(|w| w + 1).sum();
    let first = width.saturating_sub(used).max(4);

    let mut widths = Vec::with_capacity(columns.len());
    widths.push(first);
    widths.extend(fixed);

    let headers: Vec<String> = columns.iter().map(|c| c.header.clone()).collect();
    out.push("-".repeat(width));
    out.push(table_line(columns, &widths, &headers));
    out.push("-".repeat(width));

    for row in rows {
        let name = row.first().map(String::as_str).unwrap_or("");
        if char_len(name) > first {
            out.push(name.to_string());
            let mut rest = row.clone();
            if let Some(cell) = rest.first_mut() {
                cell.clear();
            }
            out.push(table_line(columns, &widths, &rest));
        } else {
            out.push(table_line(columns, &widths, row));
        }
    }
    out.push("-".repeat(width));
}

fn table_line(columns: &[Column], widths: &[usize], cells: &[String]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (col, &w))| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            match col.align {
                Align::Left => pad_right(cell, w),
                Align::Right => pad_left(cell, w),
            }
        })
        .collect();
    parts.join(" ").trim_end().to_string()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn pad_right(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(char_len(s));
    format!("{}{}", s, " ".repeat(pad))
}

fn pad_left(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(char_len(s));
    format!("{}{}", " ".repeat(pad), s)
}

fn center(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(char_len(s)) / 2;
    format!("{}{}", " ".repeat(pad), s)
}

/// `label` flush left, `value` flush right; at least one space between.
fn spread(label: &str, value: &str, width: usize) -> String {
    let gap = width
        .saturating_sub(char_len(label) + char_len(value))
        .max(1);
    format!("{}{}{}", label, " ".repeat(gap), value)
}
