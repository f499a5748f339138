//! Batch command for multiple report files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use nfrel_core::{open_document, ExtractionResult, ReportExtractor, SchemaSelection};

use super::config::load_config;
use super::render::{render, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Column layout for every file: auto, full or reduced
    #[arg(long)]
    schema: Option<SchemaSelection>,

    /// Field separator for CSV inputs (e.g. ';')
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    output_stem: String,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(schema) = args.schema {
        config.extraction.schema = schema;
    }
    if let Some(delimiter) = args.delimiter {
        config.extraction.csv_delimiter = delimiter;
    }
    let csv_delimiter = config.extraction.csv_delimiter_byte()?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "json" | "csv")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    if args.format == OutputFormat::Xlsx && args.output_dir.is_none() {
        anyhow::bail!("The xlsx format needs an output directory (--output-dir)");
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = ReportExtractor::from_config(&config.extraction);
    let mut results = Vec::with_capacity(files.len());

    let stems = output_stems(&files);
    for (path, output_stem) in files.into_iter().zip(stems) {
        let file_start = Instant::now();
        let outcome = open_document(&path, csv_delimiter).map(|doc| extractor.run(&doc));
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                results.push(FileResult {
                    path,
                    output_stem,
                    result: Some(result),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        output_stem,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for file in &results {
            let Some(result) = &file.result else { continue };

            let output_path =
                output_dir.join(format!("{}.{}", file.output_stem, args.format.extension()));

            let content = render(result, None, args.format, &config.output.sheet_name)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for file in &failed {
            eprintln!(
                "  - {}: {}",
                file.path.display(),
                file.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file stem per input. Inputs sharing a stem (`a.json`, `a.csv`)
/// keep their extension in it so neither output overwrites the other.
fn output_stems(files: &[PathBuf]) -> Vec<String> {
    let stem = |path: &PathBuf| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("report")
            .to_string()
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    for path in files {
        *seen.entry(stem(path)).or_default() += 1;
    }

    files
        .iter()
        .map(|path| {
            let name = stem(path);
            match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if seen[&name] > 1 => format!("{}_{}", name, ext.to_lowercase()),
                _ => name,
            }
        })
        .collect()
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "schema",
        "record_count",
        "total_value",
        "flagged_count",
        "zero_valued_count",
        "processing_time_ms",
        "error",
    ])?;

    for file in results {
        let filename = file.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(result) = &file.result {
            wtr.write_record([
                filename,
                "success",
                &result.schema.to_string(),
                &result.summary.record_count.to_string(),
                &format!("{:.2}", result.summary.total_value),
                &result.summary.flagged_count.to_string(),
                &result.summary.zero_valued_count.to_string(),
                &file.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                &file.processing_time_ms.to_string(),
                file.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stems_keep_extension_on_clash() {
        let files: Vec<PathBuf> = ["in/a.json", "in/a.csv", "in/b.json"]
            .iter()
            .map(PathBuf::from)
            .collect();

        assert_eq!(output_stems(&files), vec!["a_json", "a_csv", "b"]);
    }
}
