//! Batch writer: one row per invoice month on the generator sheet.

use serde::Serialize;
use tracing::{debug, warn};

use super::layout::SheetLayout;
use super::{CellRef, Result, Workbook, Worksheet};
use crate::error::SheetError;
use crate::models::config::SheetConfig;
use crate::models::record::{FieldValue, InvoiceRecord, Month};

/// Why a record was not placed on the generator sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The record has no canonical month.
    NoMonth,
    /// No row in the label column carries the month's label.
    NoRow(Month),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    /// Position of the record in the batch.
    pub index: usize,
    pub source_file_name: String,
    pub reason: SkipReason,
}

/// What a batch write did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReport {
    /// Summary sheet that received the first record's identification.
    pub summary_sheet: Option<String>,
    pub generator_sheet: String,
    /// Month and row of every placed record, in batch order.
    pub rows: Vec<(Month, u32)>,
    pub cells_written: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Write a batch of records into a balance workbook.
///
/// The first record's consumer unit and address go to the summary sheet.
/// Each record with a month is then written on the row whose label cell
/// matches that month; a later record for the same month overwrites an
/// earlier one.
pub fn write_batch<W: Workbook>(
    workbook: &mut W,
    records: &[InvoiceRecord],
    config: &SheetConfig,
) -> Result<WriteReport> {
    let names = workbook.sheet_names();
    let first_sheet = names.first().ok_or(SheetError::EmptyWorkbook)?;

    let mut report = WriteReport::default();

    if let Some(first) = records.first() {
        report.summary_sheet = write_summary(workbook, &names, first, config)?;
    }

    report.generator_sheet = if names.contains(&config.generator_sheet) {
        config.generator_sheet.clone()
    } else {
        warn!(
            "Sheet {:?} not found, writing to {:?}",
            config.generator_sheet, first_sheet
        );
        first_sheet.clone()
    };

    let sheet = workbook
        .sheet_mut(&report.generator_sheet)
        .ok_or_else(|| SheetError::SheetNotFound(report.generator_sheet.clone()))?;

    for (index, record) in records.iter().enumerate() {
        let skip = |reason| SkippedRecord {
            index,
            source_file_name: record.source_file_name.clone(),
            reason,
        };

        let Some(month) = record.month else {
            debug!("Skipping record {} without a month", index);
            report.skipped.push(skip(SkipReason::NoMonth));
            continue;
        };

        let Some(row) = find_month_row(&*sheet, month, config)? else {
            warn!("No row labeled {:?} on {:?}", month.label(), report.generator_sheet);
            report.skipped.push(skip(SkipReason::NoRow(month)));
            continue;
        };

        let layout = SheetLayout::for_group(record.tariff_group);
        for (field, column) in &layout.columns {
            sheet.set(CellRef::new(column, row)?, record.get(*field));
            report.cells_written += 1;
        }
        debug!("Wrote {} to row {}", month, row);
        report.rows.push((month, row));
    }

    Ok(report)
}

fn write_summary<W: Workbook>(
    workbook: &mut W,
    names: &[String],
    record: &InvoiceRecord,
    config: &SheetConfig,
) -> Result<Option<String>> {
    let marker = config.summary_marker.to_uppercase();
    let Some(name) = names.iter().find(|n| n.to_uppercase().contains(&marker)) else {
        debug!("No summary sheet matching {:?}", marker);
        return Ok(None);
    };

    let unit_cell: CellRef = config.summary_unit_cell.parse()?;
    let address_cell: CellRef = config.summary_address_cell.parse()?;

    if let Some(sheet) = workbook.sheet_mut(name) {
        sheet.set(unit_cell, FieldValue::Text(record.consumer_unit_id.clone()));
        sheet.set(address_cell, FieldValue::Text(record.address.clone()));
    }

    Ok(Some(name.clone()))
}

fn find_month_row<S: Worksheet>(
    sheet: &S,
    month: Month,
    config: &SheetConfig,
) -> Result<Option<u32>> {
    let label = SheetLayout::month_label(month);

    for row in config.first_row..config.last_row {
        let cell = CellRef::new(&config.label_column, row)?;
        if sheet
            .get(cell)
            .is_some_and(|value| value.to_string().trim() == label)
        {
            return Ok(Some(row));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::TariffGroup;
    use crate::sheet::MemoryWorkbook;

    fn record(month: Option<Month>) -> InvoiceRecord {
        let mut record = InvoiceRecord::empty(TariffGroup::B);
        record.consumer_unit_id = "140753532".to_string();
        record.address = "RUA DAS FLORES, 123".to_string();
        record.month = month;
        record.active_energy = 350.0;
        record.total_amount = 289.47;
        record.meter_id = "12345678-9".to_string();
        record
    }

    fn cell(workbook: &MemoryWorkbook, sheet: &str, cell: &str) -> Option<FieldValue> {
        workbook
            .sheet(sheet)
            .and_then(|s| s.get(cell.parse().unwrap()))
            .cloned()
    }

    #[test]
    fn test_write_batch() {
        let config = SheetConfig::default();
        let mut workbook = MemoryWorkbook::template(&config).unwrap();
        let records = vec![record(Some(Month::Mar)), record(Some(Month::Jan))];

        let report = write_batch(&mut workbook, &records, &config).unwrap();

        assert_eq!(report.summary_sheet.as_deref(), Some("RESUMO"));
        assert_eq!(report.generator_sheet, "UC GERADORA");
        assert_eq!(report.rows, vec![(Month::Mar, 7), (Month::Jan, 5)]);
        assert_eq!(report.cells_written, 20);
        assert!(report.skipped.is_empty());

        assert_eq!(
            cell(&workbook, "RESUMO", "F7"),
            Some(FieldValue::Text("140753532".to_string()))
        );
        assert_eq!(cell(&workbook, "UC GERADORA", "K7"), Some(FieldValue::Number(350.0)));
        assert_eq!(cell(&workbook, "UC GERADORA", "N5"), Some(FieldValue::Number(289.47)));
        assert_eq!(
            cell(&workbook, "UC GERADORA", "R5"),
            Some(FieldValue::Text("12345678-9".to_string()))
        );
        assert_eq!(cell(&workbook, "UC GERADORA", "K6"), None);
    }

    #[test]
    fn test_records_without_month_or_row_are_skipped() {
        let config = SheetConfig {
            last_row: 8,
            ..SheetConfig::default()
        };
        let mut workbook = MemoryWorkbook::template(&config).unwrap();
        let mut unplaced = record(None);
        unplaced.source_file_name = "sem-mes.pdf".to_string();
        let records = vec![unplaced, record(Some(Month::Dez))];

        let report = write_batch(&mut workbook, &records, &config).unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.cells_written, 0);
        assert_eq!(
            report.skipped,
            vec![
                SkippedRecord {
                    index: 0,
                    source_file_name: "sem-mes.pdf".to_string(),
                    reason: SkipReason::NoMonth,
                },
                SkippedRecord {
                    index: 1,
                    source_file_name: String::new(),
                    reason: SkipReason::NoRow(Month::Dez),
                },
            ]
        );
        // The summary still comes from the first record
        assert_eq!(
            cell(&workbook, "RESUMO", "G7"),
            Some(FieldValue::Text("RUA DAS FLORES, 123".to_string()))
        );
    }

    #[test]
    fn test_falls_back_to_first_sheet() {
        let config = SheetConfig::default();
        let mut workbook = MemoryWorkbook::new();
        let sheet = workbook.add_sheet("Planilha1");
        sheet.set("A9".parse().unwrap(), FieldValue::Text(" Mai ".to_string()));

        let report = write_batch(&mut workbook, &[record(Some(Month::Mai))], &config).unwrap();

        assert_eq!(report.summary_sheet, None);
        assert_eq!(report.generator_sheet, "Planilha1");
        assert_eq!(report.rows, vec![(Month::Mai, 9)]);
    }

    #[test]
    fn test_empty_workbook() {
        let mut workbook = MemoryWorkbook::new();
        let result = write_batch(&mut workbook, &[], &SheetConfig::default());
        assert_eq!(result, Err(SheetError::EmptyWorkbook));
    }
}
