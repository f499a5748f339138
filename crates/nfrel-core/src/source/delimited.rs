//! CSV exports, read as a single page table.

use csv::ReaderBuilder;

use super::{PageSource, Result};
use crate::error::SourceError;
use crate::models::document::{PageTable, RawRow};

/// Page source for a CSV table export.
///
/// Every record becomes a row of one page; header lines are left in and
/// filtered later like any repeated header.
#[derive(Debug)]
pub struct CsvPageSource {
    delimiter: u8,
    table: Option<PageTable>,
}

impl CsvPageSource {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            table: None,
        }
    }

    /// Set the field delimiter (e.g. `b';'` for locale exports).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for CsvPageSource {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(data);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(RawRow::from_cells(record.iter()));
        }

        self.table = Some(PageTable::new(rows));
        Ok(())
    }

    fn page_count(&self) -> u32 {
        if self.table.is_some() { 1 } else { 0 }
    }

    fn page_table(&self, page: u32) -> Result<Option<PageTable>> {
        let table = self.table.as_ref().ok_or(SourceError::NotLoaded)?;
        if page != 1 {
            return Err(SourceError::InvalidPage(page));
        }
        Ok(Some(table.clone()))
    }
}
