//! Record assembly: page tables in, ordered fiscal records out.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::models::config::ExtractionConfig;
use crate::models::document::Document;
use crate::models::record::{Anomaly, Field, FiscalRecord, ReportSummary};

use super::rules::{
    sanitize_access_key, sanitize_cell, ColumnSchema, LineBreak, MappedRow, MonetaryParser,
    ParsedAmount, RowClass, RowClassifier, SchemaMapper, SchemaSelection, Slot,
};
use super::summary::summarize;

/// Row and page counters for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub pages: usize,
    pub pages_without_table: usize,
    pub rows_seen: usize,
    pub blank_rows: usize,
    pub header_rows: usize,
    pub data_rows: usize,
}

/// Result of extracting a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Layout used for every row.
    pub schema: ColumnSchema,
    /// Totals over `records`.
    pub summary: ReportSummary,
    /// Records in document order.
    pub records: Vec<FiscalRecord>,
    pub stats: ExtractionStats,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turns a document's page tables into fiscal records.
#[derive(Debug, Clone)]
pub struct ReportExtractor {
    classifier: RowClassifier,
    amounts: MonetaryParser,
    schema: SchemaSelection,
    max_access_key_len: usize,
}

impl ReportExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            classifier: RowClassifier::new(),
            amounts: MonetaryParser::new(),
            schema: SchemaSelection::Auto,
            max_access_key_len: 44,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_header_tokens(&config.header_tokens)
            .with_currency_symbol(&config.currency_symbol)
            .with_schema(config.schema)
            .with_max_access_key_len(config.max_access_key_len)
    }

    /// Set the header tokens.
    pub fn with_header_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.classifier = RowClassifier::with_header_tokens(tokens);
        self
    }

    /// Set the currency symbol stripped from amounts.
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.amounts = self.amounts.with_currency_symbol(symbol);
        self
    }

    /// Force a layout instead of detecting it.
    pub fn with_schema(mut self, schema: SchemaSelection) -> Self {
        self.schema = schema;
        self
    }

    /// Set the longest accepted access key.
    pub fn with_max_access_key_len(mut self, len: usize) -> Self {
        self.max_access_key_len = len;
        self
    }

    /// Layout for this document.
    pub fn resolve_schema(&self, document: &Document) -> ColumnSchema {
        let observed = document.observed_column_count();
        let schema = self.schema.resolve(observed);
        debug!(
            "Observed {} columns, selection {} -> {} layout",
            observed, self.schema, schema
        );
        schema
    }

    /// Extract the ordered records of a document.
    pub fn extract(&self, document: &Document) -> Vec<FiscalRecord> {
        self.run(document).records
    }

    /// Extract records plus totals and counters.
    pub fn run(&self, document: &Document) -> ExtractionResult {
        let schema = self.resolve_schema(document);
        let mapper = SchemaMapper::new(schema);

        let mut stats = ExtractionStats {
            pages: document.pages.len(),
            ..Default::default()
        };
        let mut records = Vec::new();

        for page in &document.pages {
            let Some(table) = &page.table else {
                debug!("Page {}: no table", page.number);
                stats.pages_without_table += 1;
                continue;
            };

            let before = records.len();
            for (index, row) in table.rows.iter().enumerate() {
                stats.rows_seen += 1;
                match self.classifier.classify(row) {
                    RowClass::Blank => {
                        trace!("Page {} row {}: blank, skipped", page.number, index);
                        stats.blank_rows += 1;
                    }
                    RowClass::Header => {
                        trace!("Page {} row {}: header, skipped", page.number, index);
                        stats.header_rows += 1;
                    }
                    RowClass::Data => {
                        stats.data_rows += 1;
                        let record = self.assemble(&mapper.map(row));
                        for anomaly in &record.anomalies {
                            warn!("Page {} row {}: {}", page.number, index, anomaly);
                        }
                        records.push(record);
                    }
                }
            }

            debug!(
                "Page {}: {} rows, {} records",
                page.number,
                table.rows.len(),
                records.len() - before
            );
        }

        let summary = summarize(&records);
        debug!(
            "Extracted {} records, total {}, {} flagged",
            summary.record_count, summary.total_value, summary.flagged_count
        );

        ExtractionResult {
            schema,
            summary,
            records,
            stats,
        }
    }

    fn assemble(&self, mapped: &MappedRow<'_>) -> FiscalRecord {
        let mut anomalies = Vec::new();

        if mapped.is_short() {
            anomalies.push(Anomaly::MissingFields {
                expected: mapped.expected,
                found: mapped.found,
            });
        }

        let text = |field: Field| match mapped.slot(field) {
            Slot::Cell(cell) => sanitize_cell(cell, LineBreak::Space),
            Slot::Missing | Slot::NotInSchema => String::new(),
        };
        let optional = |field: Field| match mapped.slot(field) {
            Slot::Cell(cell) => Some(sanitize_cell(cell, LineBreak::Space)),
            Slot::Missing | Slot::NotInSchema => None,
        };

        let chave_acesso = match mapped.slot(Field::ChaveAcesso) {
            Slot::Cell(cell) => sanitize_access_key(cell, self.max_access_key_len)
                .unwrap_or_else(|anomaly| {
                    anomalies.push(anomaly);
                    String::new()
                }),
            Slot::Missing | Slot::NotInSchema => String::new(),
        };

        // Amounts go to the parser as printed, not through generic cleaning
        let valor = match mapped.slot(Field::Valor) {
            Slot::Cell(cell) => {
                let parsed = self.amounts.parse(cell);
                let value = parsed.value();
                match parsed {
                    ParsedAmount::Value(_) => {}
                    ParsedAmount::Invalid { cleaned } => {
                        anomalies.push(Anomaly::UnparsedAmount { raw: cleaned });
                    }
                    ParsedAmount::Blank => {
                        anomalies.push(Anomaly::UnparsedAmount {
                            raw: cell.unwrap_or_default().to_string(),
                        });
                    }
                }
                value
            }
            Slot::Missing | Slot::NotInSchema => ParsedAmount::Blank.value(),
        };

        FiscalRecord {
            emissao: text(Field::Emissao),
            serie: optional(Field::Serie),
            numero: text(Field::Numero),
            situacao: text(Field::Situacao),
            chave_acesso,
            cfop: optional(Field::Cfop),
            valor,
            anomalies,
        }
    }
}

impl Default for ReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}
