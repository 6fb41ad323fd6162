//! CLI subcommands.

pub mod batch;
pub mod config;
mod output;
pub mod process;
mod xlsx;

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use tracing::{debug, warn};

use fatura_core::models::config::PdfConfig;
use fatura_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use fatura_core::{FaturaConfig, GroupSelection};

/// Tariff group override.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GroupArg {
    /// Detect from the invoice text
    Auto,
    /// Time-of-use (peak / off-peak / reserved)
    A,
    /// Single-class
    B,
}

impl From<GroupArg> for GroupSelection {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Auto => GroupSelection::Auto,
            GroupArg::A => GroupSelection::A,
            GroupArg::B => GroupSelection::B,
        }
    }
}

/// Load the `--config` file, else the user config file, else defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<FaturaConfig> {
    if let Some(path) = config_path {
        return Ok(FaturaConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(FaturaConfig::from_file(&default_path)?)
    } else {
        Ok(FaturaConfig::default())
    }
}

/// Whether the batch command picks up a file.
pub(crate) fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
}

/// Read the text of an invoice: PDFs through the extractor, `.txt` as is.
///
/// A PDF without a usable text layer is not an error: its (short or empty)
/// text still goes through extraction and yields a defaulted record.
pub(crate) fn read_document_text(
    path: &Path,
    pdf_config: &PdfConfig,
) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor =
                PdfExtractor::new().with_min_text_length(pdf_config.min_text_length);
            extractor.load(&data)?;

            let content = extractor.extract_all()?;
            debug!(
                "PDF {} has {} pages, type {:?}",
                path.display(),
                content.page_count,
                content.pdf_type
            );

            if content.pdf_type == PdfType::Empty {
                warn!(
                    "{} has no usable text layer ({} chars), fields will default",
                    path.display(),
                    content.text.trim().len()
                );
            }
            Ok(content.text)
        }
        "txt" => {
            let text = fs::read_to_string(path)?;
            if text.trim().is_empty() {
                warn!("{} is empty, fields will default", path.display());
            }
            Ok(text)
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}
