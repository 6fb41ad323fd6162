//! Consumption history table printed on time-of-use invoices.
//!
//! Each row reads `<MMM>/<YY>` followed by the demand and consumption columns:
//! demand P / FP / HR, consumption P / FP / HR, then a reserved column.

use tracing::trace;

use crate::models::config::ReservedColumn;
use crate::models::record::{HistoricalEntry, Month};

use super::numbers::parse_br_number;
use super::patterns::HISTORY_ROW;
use super::{ExtractionMatch, FieldExtractor};

/// Minimum numeric columns for a row to count as a table row.
pub const MIN_HISTORY_COLUMNS: usize = 7;

/// Rows recovered from a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    /// Well-formed rows in order of appearance.
    pub entries: Vec<ExtractionMatch<HistoricalEntry>>,
    /// Month-tagged rows dropped for having too few columns.
    pub discarded: usize,
}

/// History table extractor.
#[derive(Debug, Default)]
pub struct HistoryExtractor {
    reserved_column: ReservedColumn,
}

impl HistoryExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose which column feeds `consumption_reserved`.
    pub fn with_reserved_column(mut self, column: ReservedColumn) -> Self {
        self.reserved_column = column;
        self
    }

    /// Scan every row, keeping well-formed ones and counting the rest.
    pub fn extract_table(&self, text: &str) -> HistoryTable {
        let mut table = HistoryTable::default();

        for caps in HISTORY_ROW.captures_iter(text) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };
            let Some(month) = Month::from_code(&caps[1]) else {
                continue;
            };
            let tokens: Vec<&str> = caps[3].split_whitespace().collect();

            if tokens.len() < MIN_HISTORY_COLUMNS {
                trace!(
                    "Dropping history row {:?} with {} columns",
                    full_match.as_str(),
                    tokens.len()
                );
                table.discarded += 1;
                continue;
            }

            let values: Vec<f64> = tokens.iter().map(|t| parse_br_number(t)).collect();
            let year = 2000 + caps[2].parse::<i32>().unwrap_or(0);

            let entry = HistoricalEntry {
                month,
                year,
                demand_peak: values[0],
                demand_off_peak: values[1],
                demand_reserved: values[2],
                consumption_peak: values[3],
                consumption_off_peak: values[4],
                consumption_reserved: values[self.reserved_column.index()],
                reserved_column: values[6],
            };

            table.entries.push(
                ExtractionMatch::new(entry, full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            );
        }

        table
    }
}

impl FieldExtractor for HistoryExtractor {
    type Output = ExtractionMatch<HistoricalEntry>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.extract_table(text).entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: &str = "HISTÓRICO DE CONSUMO \
        DEZ/25 120,00 130,00 0,00 1.500,00 9.800,00 0,00 45,00 \
        NOV/25 118,00 128,00 0,00 1.420,00 9.650,00 0,00 44,00 \
        OUT/25 121,00 131,00 0,00 1.480,00 9.700,00 0,00 46,00";

    #[test]
    fn test_extract_rows_in_source_order() {
        let table = HistoryExtractor::new().extract_table(ROWS);
        let months: Vec<Month> = table.entries.iter().map(|e| e.value.month).collect();

        assert_eq!(months, vec![Month::Dez, Month::Nov, Month::Out]);
        assert_eq!(table.discarded, 0);

        let first = &table.entries[0].value;
        assert_eq!(first.year, 2025);
        assert_eq!(first.demand_peak, 120.0);
        assert_eq!(first.demand_off_peak, 130.0);
        assert_eq!(first.consumption_peak, 1500.0);
        assert_eq!(first.consumption_off_peak, 9800.0);
        assert_eq!(first.consumption_reserved, 0.0);
        assert_eq!(first.reserved_column, 45.0);
    }

    #[test]
    fn test_reserved_column_mapping() {
        let table = HistoryExtractor::new()
            .with_reserved_column(ReservedColumn::Seventh)
            .extract_table(ROWS);

        assert_eq!(table.entries[1].value.consumption_reserved, 44.0);
        assert_eq!(table.entries[1].value.reserved_column, 44.0);
    }

    #[test]
    fn test_short_rows_are_discarded() {
        let text = format!("{} SET/25 1,00 2,00 3,00 4,00 5,00 6,00", ROWS);
        let table = HistoryExtractor::new().extract_table(&text);

        assert_eq!(table.entries.len(), 3);
        assert_eq!(table.discarded, 1);
    }

    #[test]
    fn test_no_rows() {
        let table = HistoryExtractor::new().extract_table("SEM HISTÓRICO");
        assert!(table.entries.is_empty());
        assert_eq!(table.discarded, 0);
    }
}
