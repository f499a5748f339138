//! Extract command - records and totals from a single report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use nfrel_core::report::rules::{format_brl_amount, parse_brl_amount};
use nfrel_core::{open_document, ExtractionResult, Reconciliation, ReportExtractor, SchemaSelection};

use super::config::load_config;
use super::render::{render, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Page table dump (.json) or table export (.csv)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Column layout: auto, full (7 columns) or reduced (5 columns)
    #[arg(long)]
    schema: Option<SchemaSelection>,

    /// Field separator for CSV inputs (e.g. ';')
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Total printed on the report, e.g. "R$ 1.244,56"
    #[arg(long)]
    expected_total: Option<String>,

    /// Exit with an error when no records are found
    #[arg(long)]
    fail_on_empty: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(schema) = args.schema {
        config.extraction.schema = schema;
    }
    if let Some(delimiter) = args.delimiter {
        config.extraction.csv_delimiter = delimiter;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.format == OutputFormat::Xlsx && args.output.is_none() {
        anyhow::bail!("The xlsx format needs an output file (--output)");
    }

    let printed_total = match &args.expected_total {
        Some(raw) => Some(
            parse_brl_amount(raw)
                .ok_or_else(|| anyhow::anyhow!("Invalid --expected-total: {}", raw))?,
        ),
        None => None,
    };

    info!("Processing file: {}", args.input.display());

    let document = open_document(&args.input, config.extraction.csv_delimiter_byte()?)?;
    let result = ReportExtractor::from_config(&config.extraction).run(&document);

    if result.is_empty() {
        if args.fail_on_empty {
            anyhow::bail!("No records could be extracted from {}", args.input.display());
        }
        eprintln!(
            "{} No records found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
    }

    let reconciliation = printed_total
        .map(|total| result.summary.reconcile(total, config.output.amount_tolerance));

    let output = render(
        &result,
        reconciliation.as_ref(),
        args.format,
        &config.output.sheet_name,
    )?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", String::from_utf8_lossy(&output));
    }

    print_summary(&result, reconciliation.as_ref());

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Short summary on stderr, so stdout stays clean for piping.
fn print_summary(result: &ExtractionResult, reconciliation: Option<&Reconciliation>) {
    let summary = &result.summary;

    eprintln!(
        "{} {} records, total R$ {} ({} layout)",
        style("ℹ").blue(),
        summary.record_count,
        format_brl_amount(summary.total_value),
        result.schema
    );

    if summary.flagged_count > 0 {
        eprintln!(
            "{} {} records need review",
            style("⚠").yellow(),
            summary.flagged_count
        );
    }

    if summary.zero_valued_count > 0 {
        eprintln!(
            "{} {} records with zero value",
            style("ℹ").blue(),
            summary.zero_valued_count
        );
    }

    if let Some(rec) = reconciliation {
        if rec.matches {
            eprintln!(
                "{} Matches printed total R$ {}",
                style("✓").green(),
                format_brl_amount(rec.printed_total)
            );
        } else {
            eprintln!(
                "{} Printed total R$ {} differs by R$ {}",
                style("✗").red(),
                format_brl_amount(rec.printed_total),
                format_brl_amount(rec.difference)
            );
        }
    }
}
