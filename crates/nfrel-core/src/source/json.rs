//! JSON page table dumps from the table detector.
//!
//! Accepted shapes:
//! - `[page, ...]`
//! - `{"pages": [page, ...]}`
//!
//! where a page is `null` (no table) or an array of rows, and a row is an
//! array of cells. Cells are strings or `null`. Any other cell is a layout
//! error: a bare number has lost its printed form, and `1234.56` read as
//! report text would be taken for 123.456,00.

use serde_json::Value;
use tracing::trace;

use super::{PageSource, Result};
use crate::error::SourceError;
use crate::models::document::{PageTable, RawRow};

/// Page source reading a JSON dump.
#[derive(Debug, Default)]
pub struct JsonPageSource {
    pages: Option<Vec<Option<PageTable>>>,
}

impl JsonPageSource {
    pub fn new() -> Self {
        Self { pages: None }
    }

    fn parse_pages(value: Value) -> Result<Vec<Option<PageTable>>> {
        let pages = match value {
            Value::Array(pages) => pages,
            Value::Object(mut obj) => match obj.remove("pages") {
                Some(Value::Array(pages)) => pages,
                _ => return Err(SourceError::Layout("expected a \"pages\" array".to_string())),
            },
            other => {
                return Err(SourceError::Layout(format!(
                    "expected an array of pages, found {}",
                    kind(&other)
                )))
            }
        };

        pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| Self::parse_page(i + 1, page))
            .collect()
    }

    fn parse_page(number: usize, page: Value) -> Result<Option<PageTable>> {
        let rows = match page {
            Value::Null => return Ok(None),
            Value::Array(rows) => rows,
            other => {
                return Err(SourceError::Layout(format!(
                    "page {}: expected rows or null, found {}",
                    number,
                    kind(&other)
                )))
            }
        };

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(r, row)| match row {
                Value::Array(cells) => cells
                    .into_iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        cell_text(cell).map_err(|found| {
                            SourceError::Layout(format!(
                                "page {} row {} cell {}: expected text or null, found {}",
                                number, r, c, found
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(RawRow),
                Value::Null => Ok(RawRow::default()),
                other => Err(SourceError::Layout(format!(
                    "page {} row {}: expected cells, found {}",
                    number,
                    r,
                    kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        trace!("JSON page {}: {} rows", number, rows.len());
        Ok(Some(PageTable::new(rows)))
    }
}

fn cell_text(cell: Value) -> std::result::Result<Option<String>, &'static str> {
    match cell {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl PageSource for JsonPageSource {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let value: Value = serde_json::from_slice(data)?;
        self.pages = Some(Self::parse_pages(value)?);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.pages.as_ref().map_or(0, |p| p.len() as u32)
    }

    fn page_table(&self, page: u32) -> Result<Option<PageTable>> {
        let pages = self.pages.as_ref().ok_or(SourceError::NotLoaded)?;
        if page == 0 {
            return Err(SourceError::InvalidPage(page));
        }
        pages
            .get(page as usize - 1)
            .cloned()
            .ok_or(SourceError::InvalidPage(page))
    }
}
