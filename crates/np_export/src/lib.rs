//! Serializes aggregated author payouts into downloadable reports.

use np_core::{AuthorPayout, Error, Result};
use std::fmt;
use std::str::FromStr;

pub mod csv_format;
pub mod pdf_format;

pub use csv_format::to_csv;
pub use pdf_format::{report_lines, to_pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
    /// Spreadsheet upload. Not implemented; always `Error::Unsupported`.
    Sheets,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "payout_report.csv",
            ExportFormat::Pdf => "payout_report.pdf",
            ExportFormat::Sheets => "payout_report",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Sheets => "application/octet-stream",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Sheets => "sheets",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            "sheets" | "google-sheets" => Ok(ExportFormat::Sheets),
            other => Err(Error::InvalidQuery(format!("Unknown export format: {}", other))),
        }
    }
}

/// Renders `payouts` in the requested format. Input is never modified.
pub fn export(format: ExportFormat, payouts: &[AuthorPayout]) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(payouts).map(String::into_bytes),
        ExportFormat::Pdf => to_pdf(payouts),
        ExportFormat::Sheets => Err(Error::Unsupported(
            "Spreadsheet export is not available; use csv or pdf".to_string(),
        )),
    }
}
