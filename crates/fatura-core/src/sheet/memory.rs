//! In-memory workbook.

use std::collections::BTreeMap;

use super::layout::SheetLayout;
use super::{CellRef, Result, Workbook, Worksheet};
use crate::models::config::SheetConfig;
use crate::models::record::{FieldValue, Month};

/// A sheet held as a sparse cell map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    name: String,
    cells: BTreeMap<CellRef, FieldValue>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &FieldValue)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Worksheet for MemorySheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, cell: CellRef) -> Option<&FieldValue> {
        self.cells.get(&cell)
    }

    fn set(&mut self, cell: CellRef, value: FieldValue) {
        self.cells.insert(cell, value);
    }
}

/// Workbook made of [`MemorySheet`]s, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank balance workbook: a summary sheet and the generator sheet with
    /// one month label per row, starting at the first searched row.
    pub fn template(config: &SheetConfig) -> Result<Self> {
        let mut workbook = Self::new();
        workbook.add_sheet(config.summary_marker.clone());

        let generator = workbook.add_sheet(config.generator_sheet.clone());
        for (offset, month) in Month::ALL.into_iter().enumerate() {
            let cell = CellRef::new(&config.label_column, config.first_row + offset as u32)?;
            generator.set(cell, FieldValue::Text(SheetLayout::month_label(month)));
        }

        Ok(workbook)
    }

    /// Append an empty sheet and return it.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut MemorySheet {
        self.sheets.push(MemorySheet::new(name));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }
}

impl Workbook for MemoryWorkbook {
    type Sheet = MemorySheet;

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn sheet_mut(&mut self, name: &str) -> Option<&mut MemorySheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_layout() {
        let config = SheetConfig::default();
        let workbook = MemoryWorkbook::template(&config).unwrap();

        assert_eq!(workbook.sheet_names(), vec!["RESUMO", "UC GERADORA"]);

        let generator = workbook.sheet("UC GERADORA").unwrap();
        assert_eq!(generator.len(), 12);
        assert_eq!(
            generator.get("A5".parse().unwrap()),
            Some(&FieldValue::Text("Jan".to_string()))
        );
        assert_eq!(
            generator.get("A16".parse().unwrap()),
            Some(&FieldValue::Text("Dez".to_string()))
        );
    }

    #[test]
    fn test_template_rejects_bad_label_column() {
        let config = SheetConfig {
            label_column: "1".to_string(),
            ..SheetConfig::default()
        };
        assert!(MemoryWorkbook::template(&config).is_err());
    }

    #[test]
    fn test_set_overwrites() {
        let mut sheet = MemorySheet::new("S");
        let cell = CellRef::new("B", 2).unwrap();
        sheet.set(cell, FieldValue::Integer(1));
        sheet.set(cell, FieldValue::Integer(2));

        assert_eq!(sheet.get(cell), Some(&FieldValue::Integer(2)));
        assert_eq!(sheet.len(), 1);
    }
}
