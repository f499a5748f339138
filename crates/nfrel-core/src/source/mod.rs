//! Page table input: where raw rows come from.

mod delimited;
mod json;

pub use delimited::CsvPageSource;
pub use json::JsonPageSource;

use std::path::Path;

use tracing::debug;

use crate::error::SourceError;
use crate::models::document::{Document, PageTable};

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Trait for page table providers.
pub trait PageSource {
    /// Load page tables from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages.
    fn page_count(&self) -> u32;

    /// Table detected on a page (1-indexed), if any.
    fn page_table(&self, page: u32) -> Result<Option<PageTable>>;

    /// Collect every page into a document.
    fn document(&self) -> Result<Document> {
        let tables = (1..=self.page_count())
            .map(|page| self.page_table(page))
            .collect::<Result<Vec<_>>>()?;
        Ok(Document::from_tables(tables))
    }
}

/// Read a document from a file, choosing the source by extension.
///
/// `csv_delimiter` applies to `.csv` inputs only.
pub fn open_document(path: &Path, csv_delimiter: u8) -> crate::Result<Document> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut source: Box<dyn PageSource> = match extension.as_str() {
        "json" => Box::new(JsonPageSource::new()),
        "csv" => Box::new(CsvPageSource::new().with_delimiter(csv_delimiter)),
        _ => return Err(SourceError::UnsupportedFormat(extension).into()),
    };

    let data = std::fs::read(path)?;
    source.load(&data)?;
    debug!("Loaded {} pages from {}", source.page_count(), path.display());

    Ok(source.document()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NfrelError;

    #[test]
    fn test_open_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("report.JSON");
        std::fs::write(&json_path, r#"[[["01/01/2024", "1"]], null]"#).unwrap();
        let doc = open_document(&json_path, b',').unwrap();
        assert_eq!(doc.pages.len(), 2);

        let csv_path = dir.path().join("report.csv");
        std::fs::write(&csv_path, "01/01/2024,1\n").unwrap();
        let doc = open_document(&csv_path, b',').unwrap();
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn test_open_document_with_semicolon_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "01/01/2024;100;Normal;123;R$ 1.234,56\n").unwrap();

        let doc = open_document(&path, b';').unwrap();
        assert_eq!(doc.observed_column_count(), 5);
        let (_, row) = doc.rows().next().unwrap();
        assert_eq!(row.cell(4), Some(Some("R$ 1.234,56")));
    }

    #[test]
    fn test_open_document_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        assert!(matches!(
            open_document(&path, b','),
            Err(NfrelError::Source(SourceError::UnsupportedFormat(ext))) if ext == "pdf"
        ));
    }
}
