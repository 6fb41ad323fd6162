//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FaturaError, Result};
use crate::models::record::TariffGroup;

/// Main configuration for the fatura pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaturaConfig {
    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Workbook placement configuration.
    pub sheet: SheetConfig,
}

/// Which field table to apply to a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSelection {
    /// Detect from the invoice text.
    #[default]
    Auto,
    /// Always use the time-of-use table.
    A,
    /// Always use the single-class table.
    B,
}

impl GroupSelection {
    /// Resolve against normalized invoice text.
    pub fn resolve(self, normalized: &str) -> TariffGroup {
        match self {
            GroupSelection::Auto => TariffGroup::detect(normalized),
            GroupSelection::A => TariffGroup::A,
            GroupSelection::B => TariffGroup::B,
        }
    }
}

/// Numeric column of a history row that feeds `consumptionReserved`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedColumn {
    /// Sixth captured token (index 5).
    #[default]
    Sixth,
    /// Seventh captured token (index 6).
    Seventh,
}

impl ReservedColumn {
    /// Zero-based token index.
    pub fn index(self) -> usize {
        match self {
            ReservedColumn::Sixth => 5,
            ReservedColumn::Seventh => 6,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Tariff group selection.
    pub tariff_group: GroupSelection,

    /// History column used for reserved consumption.
    pub reserved_column: ReservedColumn,

    /// Override for the SCEE search window length (characters).
    /// `None` keeps the length declared by the field table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scee_window: Option<usize>,
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF as text-bearing.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Workbook layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Sheet receiving one row per invoice month.
    pub generator_sheet: String,

    /// Case-insensitive marker identifying the summary sheet.
    pub summary_marker: String,

    /// Summary cell receiving the consumer unit id.
    pub summary_unit_cell: String,

    /// Summary cell receiving the address.
    pub summary_address_cell: String,

    /// Column holding the month labels.
    pub label_column: String,

    /// First row scanned for a month label (inclusive).
    pub first_row: u32,

    /// Last row scanned for a month label (exclusive).
    pub last_row: u32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            generator_sheet: "UC GERADORA".to_string(),
            summary_marker: "RESUMO".to_string(),
            summary_unit_cell: "F7".to_string(),
            summary_address_cell: "G7".to_string(),
            label_column: "A".to_string(),
            first_row: 5,
            last_row: 40,
        }
    }
}

impl FaturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| FaturaError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FaturaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
