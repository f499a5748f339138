//! Fiscal report extraction: rows to records to totals.

mod assembler;
pub mod rules;
mod summary;

pub use assembler::{ExtractionResult, ExtractionStats, ReportExtractor};
pub use summary::{summarize, zero_valued};
