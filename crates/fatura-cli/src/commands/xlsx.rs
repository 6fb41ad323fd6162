//! Export of a filled workbook to `.xlsx`.

use std::path::Path;

use rust_xlsxwriter::Workbook;

use fatura_core::sheet::{MemoryWorkbook, Worksheet};
use fatura_core::FieldValue;

pub(crate) fn save_workbook(workbook: &MemoryWorkbook, path: &Path) -> anyhow::Result<()> {
    let mut xlsx = Workbook::new();

    for sheet in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for (cell, value) in sheet.cells() {
            let row = cell.row - 1;
            let col = u16::try_from(cell.column - 1)?;

            match value {
                FieldValue::Text(text) => worksheet.write_string(row, col, text)?,
                FieldValue::Integer(n) => worksheet.write_number(row, col, *n as f64)?,
                FieldValue::Number(n) => worksheet.write_number(row, col, *n)?,
            };
        }
    }

    xlsx.save(path)?;
    Ok(())
}
