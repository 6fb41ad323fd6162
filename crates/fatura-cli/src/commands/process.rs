//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fatura_core::{InvoiceParser, TariffInvoiceParser};

use super::{load_config, output, read_document_text, GroupArg};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Tariff group (default: from config, usually auto)
    #[arg(short, long, value_enum)]
    group: Option<GroupArg>,

    /// Include per-field match diagnostics
    #[arg(long)]
    diagnostics: bool,

    /// Print extraction warnings
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading document...");
    pb.set_position(10);
    let text = read_document_text(&args.input, &config.pdf)?;

    pb.set_message("Extracting invoice data...");
    pb.set_position(60);

    let mut parser = TariffInvoiceParser::from_config(&config.extraction);
    if let Some(group) = args.group {
        parser = parser.with_group(group.into());
    }

    let source_name = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let result = parser.parse_document(&text, source_name);

    pb.finish_and_clear();

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let rendered = output::format_result(&result, args.format, args.diagnostics)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    debug!(
        "Total processing time: {:?} (extraction {}ms)",
        start.elapsed(),
        result.processing_time_ms
    );

    Ok(())
}
