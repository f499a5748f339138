//! Row classification: data rows vs. blank spacers and repeated headers.

use crate::models::document::RawRow;

use super::cells::{sanitize_cell, LineBreak};

/// What a raw row is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// First cell absent or blank.
    Blank,
    /// Column header, repeated at the top of each page.
    Header,
    /// An invoice line.
    Data,
}

/// Decides which raw rows become records.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    /// Header tokens, lowercased with whitespace removed.
    header_tokens: Vec<String>,
}

/// Lowercase and drop all whitespace so "EMISSÃO", "Emissão " and "E missão" compare equal.
fn fold(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl RowClassifier {
    /// Create a classifier recognizing the "Emissão" header.
    pub fn new() -> Self {
        Self::with_header_tokens(["Emissão"])
    }

    /// Create a classifier with custom header tokens. Blank tokens are ignored.
    pub fn with_header_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let header_tokens = tokens
            .into_iter()
            .map(|t| fold(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        Self { header_tokens }
    }

    /// Whether a first cell's text marks a header row.
    pub fn is_header_cell(&self, cell: &str) -> bool {
        let folded = fold(&sanitize_cell(Some(cell), LineBreak::Space));
        self.header_tokens.iter().any(|t| folded.contains(t.as_str()))
    }

    /// Classify a row by its first cell.
    pub fn classify(&self, row: &RawRow) -> RowClass {
        let Some(first) = row.first() else {
            return RowClass::Blank;
        };

        if sanitize_cell(Some(first), LineBreak::Space).is_empty() {
            RowClass::Blank
        } else if self.is_header_cell(first) {
            RowClass::Header
        } else {
            RowClass::Data
        }
    }
}

impl Default for RowClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        RawRow::from_cells(cells.iter().copied())
    }

    #[test]
    fn test_blank_rows() {
        let classifier = RowClassifier::new();
        assert_eq!(classifier.classify(&RawRow::default()), RowClass::Blank);
        assert_eq!(classifier.classify(&RawRow(vec![None, Some("x".into())])), RowClass::Blank);
        assert_eq!(classifier.classify(&row(&["  \n", "1", "100"])), RowClass::Blank);
        assert_eq!(classifier.classify(&row(&["\"\""])), RowClass::Blank);
    }

    #[test]
    fn test_header_variants() {
        let classifier = RowClassifier::new();
        for first in ["Emissão", "EMISSÃO", " emissão ", "Data de\nEmissão", "\"Emissão\"", "E missão"] {
            assert_eq!(classifier.classify(&row(&[first, "Série"])), RowClass::Header, "{first:?}");
        }
    }

    #[test]
    fn test_data_rows() {
        let classifier = RowClassifier::new();
        assert_eq!(classifier.classify(&row(&["01/01/2024", "1"])), RowClass::Data);
        // Header token only matters in the first cell
        assert_eq!(classifier.classify(&row(&["01/01/2024", "Emissão"])), RowClass::Data);
    }

    #[test]
    fn test_custom_tokens() {
        let classifier = RowClassifier::with_header_tokens(["Emissão", "Data", "  "]);
        assert_eq!(classifier.classify(&row(&["DATA"])), RowClass::Header);
        assert_eq!(classifier.classify(&row(&["01/01/2024"])), RowClass::Data);
    }
}
