//! Config command - inspect and edit the extraction settings file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Subcommand};
use console::style;

use fatura_core::invoice::table_for;
use fatura_core::models::config::ReservedColumn;
use fatura_core::sheet::CellRef;
use fatura_core::{FaturaConfig, GroupSelection, TariffGroup};

use super::GroupArg;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective settings
    Show {
        /// Print the raw JSON file contents instead
        #[arg(long)]
        json: bool,
    },

    /// Write a configuration file with default settings
    Init {
        /// Tariff group to store instead of `auto`
        #[arg(short, long, value_enum)]
        group: Option<GroupArg>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting (e.g. "extraction.reserved_column")
    Get { key: ConfigKey },

    /// Change one setting
    Set { key: ConfigKey, value: String },

    /// Show the configuration file path
    Path,
}

/// Settings reachable through `get` / `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigKey {
    TariffGroup,
    ReservedColumn,
    SceeWindow,
    MinTextLength,
    GeneratorSheet,
    SummaryMarker,
    SummaryUnitCell,
    SummaryAddressCell,
    LabelColumn,
    FirstRow,
    LastRow,
}

impl ConfigKey {
    const ALL: [ConfigKey; 11] = [
        ConfigKey::TariffGroup,
        ConfigKey::ReservedColumn,
        ConfigKey::SceeWindow,
        ConfigKey::MinTextLength,
        ConfigKey::GeneratorSheet,
        ConfigKey::SummaryMarker,
        ConfigKey::SummaryUnitCell,
        ConfigKey::SummaryAddressCell,
        ConfigKey::LabelColumn,
        ConfigKey::FirstRow,
        ConfigKey::LastRow,
    ];

    fn name(self) -> &'static str {
        match self {
            ConfigKey::TariffGroup => "extraction.tariff_group",
            ConfigKey::ReservedColumn => "extraction.reserved_column",
            ConfigKey::SceeWindow => "extraction.scee_window",
            ConfigKey::MinTextLength => "pdf.min_text_length",
            ConfigKey::GeneratorSheet => "sheet.generator_sheet",
            ConfigKey::SummaryMarker => "sheet.summary_marker",
            ConfigKey::SummaryUnitCell => "sheet.summary_unit_cell",
            ConfigKey::SummaryAddressCell => "sheet.summary_address_cell",
            ConfigKey::LabelColumn => "sheet.label_column",
            ConfigKey::FirstRow => "sheet.first_row",
            ConfigKey::LastRow => "sheet.last_row",
        }
    }

    fn get(self, config: &FaturaConfig) -> String {
        let extraction = &config.extraction;
        let sheet = &config.sheet;
        match self {
            ConfigKey::TariffGroup => group_name(extraction.tariff_group).to_string(),
            ConfigKey::ReservedColumn => column_name(extraction.reserved_column).to_string(),
            ConfigKey::SceeWindow => extraction
                .scee_window
                .map(|w| w.to_string())
                .unwrap_or_else(|| "default".to_string()),
            ConfigKey::MinTextLength => config.pdf.min_text_length.to_string(),
            ConfigKey::GeneratorSheet => sheet.generator_sheet.clone(),
            ConfigKey::SummaryMarker => sheet.summary_marker.clone(),
            ConfigKey::SummaryUnitCell => sheet.summary_unit_cell.clone(),
            ConfigKey::SummaryAddressCell => sheet.summary_address_cell.clone(),
            ConfigKey::LabelColumn => sheet.label_column.clone(),
            ConfigKey::FirstRow => sheet.first_row.to_string(),
            ConfigKey::LastRow => sheet.last_row.to_string(),
        }
    }

    /// Parse `value` for this key and store it.
    fn set(self, config: &mut FaturaConfig, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        let extraction = &mut config.extraction;
        let sheet = &mut config.sheet;

        match self {
            ConfigKey::TariffGroup => {
                extraction.tariff_group = match value.to_ascii_lowercase().as_str() {
                    "auto" => GroupSelection::Auto,
                    "a" => GroupSelection::A,
                    "b" => GroupSelection::B,
                    _ => anyhow::bail!("expected auto, a or b"),
                }
            }
            ConfigKey::ReservedColumn => {
                extraction.reserved_column = match value.to_ascii_lowercase().as_str() {
                    "sixth" | "6" => ReservedColumn::Sixth,
                    "seventh" | "7" => ReservedColumn::Seventh,
                    _ => anyhow::bail!("expected sixth or seventh"),
                }
            }
            ConfigKey::SceeWindow => {
                extraction.scee_window = match value {
                    "default" | "none" => None,
                    _ => Some(positive(value)?),
                }
            }
            ConfigKey::MinTextLength => config.pdf.min_text_length = value.parse()?,
            ConfigKey::GeneratorSheet => sheet.generator_sheet = non_empty(value)?,
            ConfigKey::SummaryMarker => sheet.summary_marker = non_empty(value)?,
            ConfigKey::SummaryUnitCell => sheet.summary_unit_cell = cell(value)?,
            ConfigKey::SummaryAddressCell => sheet.summary_address_cell = cell(value)?,
            ConfigKey::LabelColumn => {
                let column = CellRef::new(value, 1)?;
                sheet.label_column = column.column_letters();
            }
            ConfigKey::FirstRow => {
                let row = positive(value)? as u32;
                if row >= sheet.last_row {
                    anyhow::bail!("first row must be below last row {}", sheet.last_row);
                }
                sheet.first_row = row;
            }
            ConfigKey::LastRow => {
                let row = positive(value)? as u32;
                if row <= sheet.first_row {
                    anyhow::bail!("last row must be above first row {}", sheet.first_row);
                }
                sheet.last_row = row;
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = ConfigKey::ALL.iter().map(|k| k.name()).collect();
                format!("unknown configuration key (known: {})", known.join(", "))
            })
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn group_name(selection: GroupSelection) -> &'static str {
    match selection {
        GroupSelection::Auto => "auto",
        GroupSelection::A => "a",
        GroupSelection::B => "b",
    }
}

fn column_name(column: ReservedColumn) -> &'static str {
    match column {
        ReservedColumn::Sixth => "sixth",
        ReservedColumn::Seventh => "seventh",
    }
}

fn positive(value: &str) -> anyhow::Result<usize> {
    match value.parse::<usize>()? {
        0 => anyhow::bail!("must be greater than zero"),
        n => Ok(n),
    }
}

fn non_empty(value: &str) -> anyhow::Result<String> {
    if value.is_empty() {
        anyhow::bail!("must not be empty");
    }
    Ok(value.to_string())
}

fn cell(value: &str) -> anyhow::Result<String> {
    Ok(value.parse::<CellRef>()?.to_string())
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show { json } => show_config(&path, json),
        ConfigCommand::Init { group, force } => init_config(&path, group, force),
        ConfigCommand::Get { key } => {
            println!("{}", key.get(&load_or_default(&path)?));
            Ok(())
        }
        ConfigCommand::Set { key, value } => set_config(&path, key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fatura")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<FaturaConfig> {
    if path.exists() {
        Ok(FaturaConfig::from_file(path)?)
    } else {
        Ok(FaturaConfig::default())
    }
}

fn show_config(path: &Path, json: bool) -> anyhow::Result<()> {
    if !path.exists() {
        println!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }
    let config = load_or_default(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", style("Extraction").bold());
    println!(
        "  Tariff group:     {}",
        match config.extraction.tariff_group {
            GroupSelection::Auto => "auto (time-of-use labels select group A)",
            GroupSelection::A => "A (time-of-use)",
            GroupSelection::B => "B (single-class)",
        }
    );
    println!(
        "  History reserved: {} token",
        column_name(config.extraction.reserved_column)
    );
    for group in [TariffGroup::B, TariffGroup::A] {
        let table = table_for(group);
        let window = config.extraction.scee_window.unwrap_or(table.scee_window);
        println!("  SCEE window {}:    {} chars (table {})", group, window, table.version());
    }
    println!("{}", style("PDF").bold());
    println!("  Min text length:  {}", config.pdf.min_text_length);
    println!("{}", style("Workbook").bold());
    let sheet = &config.sheet;
    println!("  Generator sheet:  {}", sheet.generator_sheet);
    println!(
        "  Summary sheet:    *{}* ({} unit, {} address)",
        sheet.summary_marker, sheet.summary_unit_cell, sheet.summary_address_cell
    );
    println!(
        "  Month labels:     {}{}..{}{}",
        sheet.label_column,
        sheet.first_row,
        sheet.label_column,
        sheet.last_row - 1
    );

    Ok(())
}

fn init_config(path: &Path, group: Option<GroupArg>, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut config = FaturaConfig::default();
    if let Some(group) = group {
        config.extraction.tariff_group = group.into();
    }
    config.save(path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set_config(path: &Path, key: ConfigKey, value: &str) -> anyhow::Result<()> {
    let mut config = load_or_default(path)?;
    key.set(&mut config, value)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!("{} Set {} = {}", style("✓").green(), key, key.get(&config));
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'fatura config init' to create a configuration file.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(key.name().parse::<ConfigKey>(), Ok(key));
        }
        assert!("extraction.unknown".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_typed_values() {
        let mut config = FaturaConfig::default();

        ConfigKey::TariffGroup.set(&mut config, "A").unwrap();
        ConfigKey::ReservedColumn.set(&mut config, "seventh").unwrap();
        ConfigKey::SceeWindow.set(&mut config, "1500").unwrap();
        ConfigKey::SummaryUnitCell.set(&mut config, "h9").unwrap();
        ConfigKey::LabelColumn.set(&mut config, "b").unwrap();

        assert_eq!(config.extraction.tariff_group, GroupSelection::A);
        assert_eq!(config.extraction.reserved_column, ReservedColumn::Seventh);
        assert_eq!(config.extraction.scee_window, Some(1500));
        assert_eq!(config.sheet.summary_unit_cell, "H9");
        assert_eq!(config.sheet.label_column, "B");

        ConfigKey::SceeWindow.set(&mut config, "default").unwrap();
        assert_eq!(ConfigKey::SceeWindow.get(&config), "default");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = FaturaConfig::default();

        assert!(ConfigKey::TariffGroup.set(&mut config, "c").is_err());
        assert!(ConfigKey::SceeWindow.set(&mut config, "0").is_err());
        assert!(ConfigKey::SummaryAddressCell.set(&mut config, "7G").is_err());
        assert!(ConfigKey::FirstRow.set(&mut config, "40").is_err());
        assert!(ConfigKey::LastRow.set(&mut config, "5").is_err());
        assert_eq!(config, FaturaConfig::default());
    }
}
