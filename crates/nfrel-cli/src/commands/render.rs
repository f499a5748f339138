//! Output formats shared by `extract` and `batch`.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use nfrel_core::report::rules::format_brl_amount;
use nfrel_core::{zero_valued, ExtractionResult, Field, FieldValue, Reconciliation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON: records, summary and counters
    Json,
    /// CSV: one line per record
    Csv,
    /// Plain text summary and table
    Text,
    /// Excel workbook (requires --output)
    Xlsx,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    result: &'a ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    reconciliation: Option<&'a Reconciliation>,
}

/// Render a result in the given format.
pub fn render(
    result: &ExtractionResult,
    reconciliation: Option<&Reconciliation>,
    format: OutputFormat,
    sheet_name: &str,
) -> anyhow::Result<Vec<u8>> {
    match format {
        OutputFormat::Json => {
            let report = Report {
                result,
                reconciliation,
            };
            Ok(serde_json::to_vec_pretty(&report)?)
        }
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result, reconciliation).into_bytes()),
        OutputFormat::Xlsx => format_xlsx(result, sheet_name),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = Field::ALL.iter().map(|f| f.label()).collect();
    header.push("Anomalias");
    wtr.write_record(&header)?;

    for record in &result.records {
        let mut line: Vec<String> = record.fields().iter().map(|(_, v)| v.to_string()).collect();
        line.push(
            record
                .anomalies
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        );
        wtr.write_record(&line)?;
    }

    Ok(wtr.into_inner()?)
}

/// Summary lines followed by the record table.
pub fn format_text(result: &ExtractionResult, reconciliation: Option<&Reconciliation>) -> String {
    let summary = &result.summary;
    let mut output = String::new();

    output.push_str(&format!("Layout: {}\n", result.schema));
    output.push_str(&format!(
        "Pages: {} ({} without table)\n",
        result.stats.pages, result.stats.pages_without_table
    ));
    output.push_str(&format!("Records: {}\n", summary.record_count));
    output.push_str(&format!("Total: R$ {}\n", format_brl_amount(summary.total_value)));
    if summary.flagged_count > 0 {
        output.push_str(&format!("Flagged: {}\n", summary.flagged_count));
    }
    if summary.zero_valued_count > 0 {
        // 1-based, matching the record table below
        let rows: Vec<String> = zero_valued(&result.records)
            .map(|(i, _)| (i + 1).to_string())
            .collect();
        output.push_str(&format!(
            "Zero value: {} (records {})\n",
            summary.zero_valued_count,
            rows.join(", ")
        ));
    }

    if !summary.by_status.is_empty() {
        output.push_str("\nBy status:\n");
        for (status, totals) in &summary.by_status {
            output.push_str(&format!(
                "  {:<12} {:>5}  R$ {}\n",
                status,
                totals.count,
                format_brl_amount(totals.total)
            ));
        }
    }

    if let Some(rec) = reconciliation {
        output.push_str(&format!(
            "\nPrinted total: R$ {} ({})\n",
            format_brl_amount(rec.printed_total),
            if rec.matches {
                "matches".to_string()
            } else {
                format!("difference R$ {}", format_brl_amount(rec.difference))
            }
        ));
    }

    if !result.records.is_empty() {
        output.push('\n');
        for (i, record) in result.records.iter().enumerate() {
            let cells: Vec<String> = record
                .fields()
                .iter()
                .map(|(_, value)| match value {
                    FieldValue::Amount(d) => format_brl_amount(*d),
                    other => other.to_string(),
                })
                .collect();
            output.push_str(&format!("{:>4}  {}", i + 1, cells.join(" | ")));
            if record.is_flagged() {
                output.push_str("  [!]");
            }
            output.push('\n');
        }
    }

    output
}

fn format_xlsx(result: &ExtractionResult, sheet_name: &str) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");

    for (col, field) in Field::ALL.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, field.label(), &bold)?;
    }

    for (i, record) in result.records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, (_, value)) in record.fields().iter().enumerate() {
            let col = col as u16;
            match value {
                // Access keys stay text so no digit is lost
                FieldValue::Text(s) => {
                    worksheet.write_string(row, col, *s)?;
                }
                FieldValue::Amount(d) => {
                    worksheet.write_number_with_format(row, col, d.to_f64().unwrap_or(0.0), &money)?;
                }
                FieldValue::Null => {}
            }
        }
    }

    worksheet.autofit();
    Ok(workbook.save_to_buffer()?)
}
