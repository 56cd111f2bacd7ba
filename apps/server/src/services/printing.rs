//! # Printing
//!
//! Renders invoices and reports to plain text at the configured paper width
//! and hands them to a [`DocumentSink`].
//!
//! ```text
//! Bill ─► render_invoice ─┐
//!                         ├─► Document ─► render_text(width) ─► DocumentSink
//! SalesReport ─► render_report ─┘                                  │
//!                                                   SpoolSink: <spool>/<kind>-<job>.txt
//! ```
//!
//! A print failure is reported as `RenderFailure`. It never undoes the bill
//! that was being printed.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use till_core::document::{render_invoice, render_report, render_text, DocumentKind};
use till_core::{Bill, Document, DocumentStyle, SalesReport};

use super::{ServiceError, ServiceResult};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Where printed documents go.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Delivers one rendered document. Returns a human-readable location.
    async fn deliver(&self, job_name: &str, text: &str) -> Result<String, SinkError>;
}

/// Writes each document as a text file into a spool directory, where the
/// printer daemon picks it up.
#[derive(Debug, Clone)]
pub struct SpoolSink {
    dir: PathBuf,
}

impl SpoolSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SpoolSink { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentSink for SpoolSink {
    async fn deliver(&self, job_name: &str, text: &str) -> Result<String, SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SinkError(format!("spool dir {}: {e}", self.dir.display())))?;

        let path = self.dir.join(format!("{job_name}.txt"));
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| SinkError(format!("{}: {e}", path.display())))?;

        Ok(path.display().to_string())
    }
}

/// Result of a print request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub job_id: String,
    pub kind: DocumentKind,
    pub location: String,
    pub width: usize,
    pub lines: usize,
}

pub struct PrintService {
    sink: Arc<dyn DocumentSink>,
    style: DocumentStyle,
    paper_width: usize,
}

impl PrintService {
    pub fn new(sink: Arc<dyn DocumentSink>, style: DocumentStyle, paper_width: usize) -> Self {
        PrintService {
            sink,
            style,
            paper_width,
        }
    }

    /// Structured invoice document. Fails with `TotalsMismatch` if the
    /// bill's amounts disagree.
    pub fn invoice_document(&self, bill: &Bill) -> ServiceResult<Document> {
        Ok(render_invoice(bill, &self.style)?)
    }

    pub fn report_document(&self, report: &SalesReport) -> ServiceResult<Document> {
        Ok(render_report(report, &self.style)?)
    }

    pub async fn print_invoice(&self, bill: &Bill) -> ServiceResult<PrintJob> {
        let document = self.invoice_document(bill)?;
        self.print(&document).await
    }

    pub async fn print_report(&self, report: &SalesReport) -> ServiceResult<PrintJob> {
        let document = self.report_document(report)?;
        self.print(&document).await
    }

    async fn print(&self, document: &Document) -> ServiceResult<PrintJob> {
        let text = render_text(document, self.paper_width);
        let job_id = Uuid::new_v4().to_string();
        let prefix = match document.kind {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Report => "report",
        };
        let job_name = format!("{prefix}-{job_id}");

        let location = self.sink.deliver(&job_name, &text).await.map_err(|e| {
            error!(job_id = %job_id, error = %e, "Print job failed");
            ServiceError::RenderFailure(e.to_string())
        })?;

        info!(job_id = %job_id, kind = prefix, location = %location, "Document printed");
        Ok(PrintJob {
            job_id,
            kind: document.kind,
            location,
            width: self.paper_width,
            lines: text.lines().count(),
        })
    }
}
