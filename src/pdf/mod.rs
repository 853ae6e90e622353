//! The PDF pipeline: document generation, page splitting, text extraction.
//!
//! The three stages are independent and communicate only through files on
//! disk: `builder` writes the large document, `split` turns it into
//! single-page files, `extract` turns those into text files with token
//! estimates. Failures here are fatal to the run; there is no partial-result
//! recovery.

pub mod builder;
pub mod extract;
pub mod layout;
pub mod split;

pub use builder::{build, compose, BuildSummary};
pub use extract::{extract, token_estimate, ExtractSummary, PageText};
pub use layout::{render, Block, DocumentPlan, Renderer, StatsTable};
pub use split::{split, PageFile, SplitSummary, PAGE_NAME_LIMIT};

use thiserror::Error;

/// Errors that can occur in the PDF pipeline
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found or not a valid PDF: {0}")]
    InvalidFile(String),

    #[error("Malformed or unreadable PDF: {0}")]
    Format(String),

    #[error("document has {pages} pages, over the {limit}-page filename limit")]
    PageLimit { pages: usize, limit: usize },
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Format(err.to_string())
    }
}

/// Bytes as megabytes with two decimals, the way summaries print sizes.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Bytes as kilobytes with one decimal.
pub fn format_kb(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1024.0)
}
