//! Spreadsheet population.
//!
//! The writer only needs sheet lookup by name and cell access by A1
//! reference, so any workbook backend can sit behind [`Workbook`].
//! [`MemoryWorkbook`] is the in-process implementation.

pub mod layout;
mod memory;
mod writer;

use std::fmt;
use std::str::FromStr;

pub use layout::SheetLayout;
pub use memory::{MemorySheet, MemoryWorkbook};
pub use writer::{write_batch, SkipReason, SkippedRecord, WriteReport};

use crate::error::SheetError;
use crate::models::record::FieldValue;

/// Result type for workbook operations.
pub type Result<T> = std::result::Result<T, SheetError>;

/// A1-style cell reference (1-based column and row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    /// Build a reference from column letters and a row number.
    pub fn new(column: &str, row: u32) -> Result<Self> {
        let invalid = || SheetError::InvalidCell(format!("{}{}", column, row));
        if row == 0 {
            return Err(invalid());
        }
        Ok(Self {
            row,
            column: column_index(column).ok_or_else(invalid)?,
        })
    }

    /// Column letters (`A`, `Z`, `AA`, ...).
    pub fn column_letters(&self) -> String {
        let mut n = self.column;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase()
            .then(|| acc * 26 + (c as u32 - 'A' as u32 + 1))
    })
}

impl FromStr for CellRef {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SheetError::InvalidCell(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        let row = digits
            .parse()
            .map_err(|_| SheetError::InvalidCell(s.to_string()))?;
        CellRef::new(letters, row).map_err(|_| SheetError::InvalidCell(s.to_string()))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

/// A single sheet of a workbook.
pub trait Worksheet {
    fn name(&self) -> &str;

    /// Value of a cell, `None` when empty.
    fn get(&self, cell: CellRef) -> Option<&FieldValue>;

    fn set(&mut self, cell: CellRef, value: FieldValue);
}

/// A workbook whose sheets can be looked up by name.
pub trait Workbook {
    type Sheet: Worksheet;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    fn sheet(&self, name: &str) -> Option<&Self::Sheet>;

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Self::Sheet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        let cell: CellRef = "F7".parse().unwrap();
        assert_eq!(cell, CellRef { row: 7, column: 6 });

        let cell: CellRef = "ab12".parse().unwrap();
        assert_eq!(cell.column, 28);
        assert_eq!(cell.to_string(), "AB12");
    }

    #[test]
    fn test_invalid_cell_refs() {
        for bad in ["", "7", "F", "F0", "1F", "F-1", "ÇA1"] {
            assert!(bad.parse::<CellRef>().is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_column_letters_round_trip() {
        for column in ["A", "Z", "AA", "AZ", "BA", "ZZ", "AAA"] {
            assert_eq!(CellRef::new(column, 1).unwrap().column_letters(), column);
        }
    }
}
