//! Configuration structures for the extraction pipeline.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{NfrelError, Result};
use crate::report::rules::SchemaSelection;

/// Main configuration for nfrel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfrelConfig {
    /// Row classification and field mapping.
    pub extraction: ExtractionConfig,

    /// Rendering and export.
    pub output: OutputConfig,
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// First-cell tokens that mark a (repeated) header row.
    pub header_tokens: Vec<String>,

    /// Column layout, or `auto` to pick it from the observed column count.
    pub schema: SchemaSelection,

    /// Currency prefix stripped from amount cells.
    pub currency_symbol: String,

    /// Longest accepted access key, in digits.
    pub max_access_key_len: usize,

    /// Field separator for CSV inputs. Locale exports often use `;`.
    pub csv_delimiter: char,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_tokens: vec!["Emissão".to_string()],
            schema: SchemaSelection::Auto,
            currency_symbol: "R$".to_string(),
            max_access_key_len: 44,
            csv_delimiter: ',',
        }
    }
}

impl ExtractionConfig {
    /// The CSV delimiter as a byte; it must be a single ASCII character.
    pub fn csv_delimiter_byte(&self) -> Result<u8> {
        if self.csv_delimiter.is_ascii() {
            Ok(self.csv_delimiter as u8)
        } else {
            Err(NfrelError::Config(format!(
                "csv_delimiter must be an ASCII character, got {:?}",
                self.csv_delimiter
            )))
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Worksheet name for spreadsheet export.
    pub sheet_name: String,

    /// Largest accepted difference between computed and printed totals.
    pub amount_tolerance: Decimal,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Relatorio_Fiscal".to_string(),
            amount_tolerance: Decimal::ZERO,
        }
    }
}

impl NfrelConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| NfrelError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| NfrelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
