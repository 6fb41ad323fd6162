//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use fatura_core::models::config::{PdfConfig, SheetConfig};
use fatura_core::sheet::{Workbook, Worksheet};
use fatura_core::{
    write_batch, ExtractionResult, InvoiceParser, MemoryWorkbook, TariffInvoiceParser,
};

use super::process::OutputFormat;
use super::{is_supported, load_config, output, read_document_text, xlsx, GroupArg};

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

    /// Tariff group (default: from config, usually auto)
    #[arg(short, long, value_enum)]
    group: Option<GroupArg>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Write the cells the batch would fill in a balance workbook (CSV)
    #[arg(long)]
    sheet_plan: Option<PathBuf>,

    /// Write the filled balance workbook
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files",
            )?
            .progress_chars("=>-"),
    );

    let mut parser = TariffInvoiceParser::from_config(&config.extraction);
    if let Some(group) = args.group {
        parser = parser.with_group(group.into());
    }

    // Extraction holds no shared state, so files run on the blocking pool;
    // results are awaited in input order
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let parser = parser.clone();
        let pdf_config = config.pdf.clone();
        let pb = overall_pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = process_single_file(&path, &parser, &pdf_config);
            pb.inc(1);

            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            match outcome {
                Ok(extraction) => ProcessResult {
                    path,
                    extraction: Some(extraction),
                    error: None,
                    processing_time_ms,
                },
                Err(e) => ProcessResult {
                    path,
                    extraction: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                },
            }
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                overall_pb.abandon();
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.extraction.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            let Some(extraction) = &result.extraction else {
                continue;
            };
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");

            let output_path =
                output_dir.join(format!("{}.{}", output_name, output::extension(args.format)));
            let content = output::format_result(extraction, args.format, false)?;

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if args.sheet_plan.is_some() || args.xlsx.is_some() {
        let records: Vec<_> = successful
            .iter()
            .filter_map(|r| r.extraction.as_ref())
            .map(|e| e.record.clone())
            .collect();

        let workbook = fill_workbook(&records, &config.sheet)?;

        if let Some(plan_path) = &args.sheet_plan {
            let template = MemoryWorkbook::template(&config.sheet)?;
            write_sheet_plan(plan_path, &template, &workbook)?;
            println!(
                "{} Sheet plan written to {}",
                style("✓").green(),
                plan_path.display()
            );
        }

        if let Some(xlsx_path) = &args.xlsx {
            xlsx::save_workbook(&workbook, xlsx_path)?;
            println!(
                "{} Workbook written to {}",
                style("✓").green(),
                xlsx_path.display()
            );
        }
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    parser: &TariffInvoiceParser,
    pdf_config: &PdfConfig,
) -> anyhow::Result<ExtractionResult> {
    let text = read_document_text(path, pdf_config)?;
    let source_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    Ok(parser.parse_document(&text, source_name))
}

/// Place the records on a fresh balance template.
fn fill_workbook(
    records: &[fatura_core::InvoiceRecord],
    sheet_config: &SheetConfig,
) -> anyhow::Result<MemoryWorkbook> {
    let mut workbook = MemoryWorkbook::template(sheet_config)?;
    let report = write_batch(&mut workbook, records, sheet_config)?;

    debug!(
        "Placed {} records ({} cells) on {}",
        report.rows.len(),
        report.cells_written,
        report.generator_sheet
    );

    for skipped in &report.skipped {
        println!(
            "{} {} not placed: {:?}",
            style("⚠").yellow(),
            skipped.source_file_name,
            skipped.reason
        );
    }

    Ok(workbook)
}

/// Cells that differ from the blank template, as `sheet,cell,value`.
fn write_sheet_plan(
    path: &Path,
    template: &MemoryWorkbook,
    filled: &MemoryWorkbook,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["sheet", "cell", "value"])?;

    for sheet in filled.sheets() {
        let blank = template.sheet(sheet.name());
        for (cell, value) in sheet.cells() {
            if blank.and_then(|b| b.get(*cell)) == Some(value) {
                continue;
            }
            wtr.write_record([sheet.name(), &cell.to_string(), &value.to_string()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "tariff_group",
        "table_version",
        "consumer_unit_id",
        "month",
        "year",
        "total_amount",
        "matched_fields",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(extraction) = &result.extraction {
            let record = &extraction.record;
            let report = &extraction.report;
            wtr.write_record([
                filename,
                "success",
                &record.tariff_group.to_string(),
                &report.table_version,
                &record.consumer_unit_id,
                record.month.map(|m| m.code()).unwrap_or(""),
                &record.year.to_string(),
                &record.total_amount.to_string(),
                &format!("{}/{}", report.matched_count(), report.fields.len()),
                &extraction.warnings.len().to_string(),
                &result.processing_time_ms.to_string(),
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
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
