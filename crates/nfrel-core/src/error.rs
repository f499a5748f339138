//! Error types for the nfrel-core library.
//!
//! Extraction itself never fails; only loading page tables and
//! configuration can.

use thiserror::Error;

/// Main error type for the nfrel library.
#[derive(Error, Debug)]
pub enum NfrelError {
    /// Page table loading error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to loading page tables.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The JSON dump could not be parsed.
    #[error("failed to parse JSON page tables: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV export could not be read.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON dump parsed but does not have the page/row/cell shape.
    #[error("unexpected page table layout: {0}")]
    Layout(String),

    /// No file extension handler for this input.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// A page was requested before anything was loaded.
    #[error("no document loaded")]
    NotLoaded,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the nfrel library.
pub type Result<T> = std::result::Result<T, NfrelError>;
