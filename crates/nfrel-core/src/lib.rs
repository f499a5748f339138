//! Core library for fiscal report table extraction.
//!
//! This crate provides:
//! - Page table input (JSON dumps from a table detector, CSV exports)
//! - Cell sanitizing and Brazilian currency parsing
//! - Row classification and column layout mapping (7 and 5 column reports)
//! - Record assembly across pages and audit totals

pub mod error;
pub mod models;
pub mod report;
pub mod source;

pub use error::{NfrelError, Result};
pub use models::document::{Document, Page, PageTable, RawRow};
pub use models::record::{Anomaly, Field, FieldValue, FiscalRecord, Reconciliation, ReportSummary, StatusTotal};
pub use report::{ExtractionResult, ExtractionStats, ReportExtractor, summarize, zero_valued};
pub use report::rules::{ColumnSchema, SchemaSelection};
pub use source::{CsvPageSource, JsonPageSource, PageSource, open_document};
