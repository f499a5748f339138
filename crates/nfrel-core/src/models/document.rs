//! Raw page tables as produced by the table detector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One detected table row: ordered cells, any of which may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(pub Vec<Option<String>>);

impl RawRow {
    /// Build a row where every cell is present.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(|c| Some(c.into())).collect())
    }

    /// Number of cells detected in this row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell at `index`.
    ///
    /// The outer `Option` is `None` when the row is shorter than `index`,
    /// the inner one when the detector reported an empty cell.
    pub fn cell(&self, index: usize) -> Option<Option<&str>> {
        self.0.get(index).map(|c| c.as_deref())
    }

    /// First cell, flattened.
    pub fn first(&self) -> Option<&str> {
        self.cell(0).flatten()
    }
}

/// All rows of the table detected on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageTable {
    pub rows: Vec<RawRow>,
}

impl PageTable {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

/// One document page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page number (1-indexed).
    pub number: u32,
    /// Detected table, if the page had one.
    pub table: Option<PageTable>,
}

/// A whole report: pages in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Build a document from per-page tables, numbering pages from 1.
    pub fn from_tables(tables: Vec<Option<PageTable>>) -> Self {
        let pages = tables
            .into_iter()
            .enumerate()
            .map(|(i, table)| Page {
                number: i as u32 + 1,
                table,
            })
            .collect();
        Self { pages }
    }

    /// Iterate over every row of every page, in document order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &RawRow)> {
        self.pages.iter().flat_map(|page| {
            page.table
                .iter()
                .flat_map(|t| t.rows.iter())
                .map(move |row| (page.number, row))
        })
    }

    /// The most frequent row width among rows that carry a first cell.
    ///
    /// Ties go to the wider layout. Returns 0 for a document without rows.
    pub fn observed_column_count(&self) -> usize {
        let mut widths: BTreeMap<usize, usize> = BTreeMap::new();
        for (_, row) in self.rows() {
            if row.first().is_some_and(|c| !c.trim().is_empty()) {
                *widths.entry(row.len()).or_insert(0) += 1;
            }
        }

        widths
            .into_iter()
            .max_by(|(wa, ca), (wb, cb)| ca.cmp(cb).then(wa.cmp(wb)))
            .map(|(width, _)| width)
            .unwrap_or(0)
    }
}
