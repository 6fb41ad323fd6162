//! Table-driven invoice parser.

use std::time::Instant;

use tracing::{debug, info, trace};

use crate::models::config::{ExtractionConfig, GroupSelection, ReservedColumn};
use crate::models::record::{InvoiceRecord, RecordField, TariffGroup};

use super::diagnostics::MatchReport;
use super::layout::{table_for, FieldTable, Merge, Scope};
use super::rules::{
    normalize_text, scee_window, AddressExtractor, FieldExtractor, HistoryExtractor,
    IdentificationExtractor, MeterExtractor, ReadingDatesExtractor,
};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Assembled record.
    pub record: InvoiceRecord,
    /// Which fields matched, and how.
    pub report: MatchReport,
    /// Extraction and validation warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse a document's text, recording where it came from.
    fn parse_document(&self, text: &str, source_file_name: &str) -> ExtractionResult;

    /// Parse invoice text with no source name.
    fn parse(&self, text: &str) -> ExtractionResult {
        self.parse_document(text, "")
    }
}

/// Parser driven by the field table of the invoice's tariff group.
///
/// Holds only configuration; parsing the same text twice gives the same record.
#[derive(Debug, Clone, Default)]
pub struct TariffInvoiceParser {
    selection: GroupSelection,
    reserved_column: ReservedColumn,
    scee_window: Option<usize>,
}

impl TariffInvoiceParser {
    /// Create a parser that detects the tariff group from the text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parser from the `extraction` config section.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            selection: config.tariff_group,
            reserved_column: config.reserved_column,
            scee_window: config.scee_window,
        }
    }

    /// Force a tariff group instead of detecting it.
    pub fn with_group(mut self, selection: GroupSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Choose the history column that feeds reserved consumption.
    pub fn with_reserved_column(mut self, column: ReservedColumn) -> Self {
        self.reserved_column = column;
        self
    }

    /// Override the table's SCEE window length (characters).
    pub fn with_scee_window(mut self, len: usize) -> Self {
        self.scee_window = Some(len);
        self
    }

    fn read_identification(
        &self,
        text: &str,
        record: &mut InvoiceRecord,
        report: &mut MatchReport,
    ) {
        report.expect(RecordField::ConsumerUnitId);
        report.expect(RecordField::Month);
        report.expect(RecordField::Year);

        if let Some(found) = IdentificationExtractor::new().extract(text) {
            record.consumer_unit_id = found.value.consumer_unit_id;
            record.month = Some(found.value.month);
            record.year = found.value.year;

            report.hit(RecordField::ConsumerUnitId, "identification", &found.source);
            report.hit(RecordField::Month, "identification", &found.source);
            report.hit(RecordField::Year, "identification", &found.source);
        }

        report.expect(RecordField::Address);
        if let Some(found) = AddressExtractor::new().extract(text) {
            report.hit(RecordField::Address, "address", &found.value);
            record.address = found.value;
        }
    }

    fn read_dates(&self, text: &str, record: &mut InvoiceRecord, report: &mut MatchReport) {
        report.expect(RecordField::PreviousReadingDate);
        report.expect(RecordField::CurrentReadingDate);

        if let Some(found) = ReadingDatesExtractor::new().extract(text) {
            report.hit(RecordField::PreviousReadingDate, "reading_dates", &found.source);
            report.hit(RecordField::CurrentReadingDate, "reading_dates", &found.source);
            record.previous_reading_date = found.value.previous;
            record.current_reading_date = found.value.current;
        }
    }

    fn read_meter(&self, text: &str, record: &mut InvoiceRecord, report: &mut MatchReport) {
        report.expect(RecordField::MeterId);
        report.expect(RecordField::PreviousReadingValue);
        report.expect(RecordField::CurrentReadingValue);

        if let Some(found) = MeterExtractor::new().extract(text) {
            report.hit(RecordField::MeterId, "meter", &found.source);
            report.hit(RecordField::PreviousReadingValue, "meter", &found.source);
            report.hit(RecordField::CurrentReadingValue, "meter", &found.source);
            record.meter_id = found.value.meter_id;
            record.previous_reading_value = found.value.previous;
            record.current_reading_value = found.value.current;
        }
    }

    fn apply_table(
        &self,
        table: &FieldTable,
        text: &str,
        record: &mut InvoiceRecord,
        report: &mut MatchReport,
    ) {
        let window_len = self.scee_window.unwrap_or(table.scee_window);
        let scee = scee_window(text, window_len);
        report.scee_found = scee.is_some();
        if scee.is_none() {
            debug!("No SCEE section found");
        }

        for field in table.fields() {
            report.expect(field);
        }

        for spec in &table.specs {
            let scoped = match (spec.scope, scee) {
                (Scope::Document, _) => text,
                (Scope::Scee { .. }, Some(window)) => window,
                (Scope::Scee { required: true }, None) => continue,
                (Scope::Scee { required: false }, None) => text,
            };

            let Some(slot) = record.number_slot(spec.field) else {
                continue;
            };

            let wanted = match spec.merge {
                Merge::Set | Merge::Add => true,
                Merge::IfUnmatched => !report.is_matched(spec.field),
                Merge::IfZero => *slot == 0.0,
            };
            if !wanted {
                continue;
            }

            let Some(hit) = spec.apply(scoped) else {
                trace!("Rule {} found nothing", spec.rule);
                continue;
            };

            trace!("Rule {} matched {:?} -> {}", spec.rule, hit.raw, hit.value);
            match spec.merge {
                Merge::Add => *slot += hit.value,
                _ => *slot = hit.value,
            }
            report.hit(spec.field, spec.rule, hit.raw);
        }
    }

    fn read_history(&self, text: &str, record: &mut InvoiceRecord, report: &mut MatchReport) {
        let table = HistoryExtractor::new()
            .with_reserved_column(self.reserved_column)
            .extract_table(text);

        report.history_rows = table.entries.len();
        report.discarded_history_rows = table.discarded;
        if table.discarded > 0 {
            debug!("Dropped {} malformed history rows", table.discarded);
        }

        record.historical_entries = table.entries.into_iter().map(|m| m.value).collect();
    }
}

impl InvoiceParser for TariffInvoiceParser {
    fn parse_document(&self, text: &str, source_file_name: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let normalized = normalize_text(text);
        let group: TariffGroup = self.selection.resolve(&normalized);
        let table = table_for(group);

        let mut record = InvoiceRecord::empty(group);
        record.source_file_name = source_file_name.to_string();
        let mut report = MatchReport::new(group, table.version());

        self.read_identification(&normalized, &mut record, &mut report);
        self.read_dates(&normalized, &mut record, &mut report);
        if table.reads_meter {
            self.read_meter(&normalized, &mut record, &mut report);
        }
        self.apply_table(table, &normalized, &mut record, &mut report);
        if table.reads_history {
            self.read_history(&normalized, &mut record, &mut report);
        }

        let mut warnings: Vec<String> = report
            .missing()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();
        warnings.extend(record.validate());

        debug!(
            "Extracted UC {:?} {} with table {} ({}/{} fields matched)",
            record.consumer_unit_id,
            record.month.map(|m| m.code()).unwrap_or("???"),
            report.table_version,
            report.matched_count(),
            report.fields.len()
        );

        ExtractionResult {
            record,
            report,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Month;

    const GROUP_B_TEXT: &str = "
        CONCESSIONÁRIA DE ENERGIA S.A.
        ENDEREÇO DE ENTREGA: RUA DAS FLORES, 123 - CENTRO CEP: 64000-000
        140753532 DEZ/2025
        12/11/2025 12/12/2025 30 12/01/2026
        12345678-9 ENERGIA ATIVA - KWH ÚNICO 10450 10800 1,00 350,00
        ENERGIA GERAÇÃO - KWH ÚNICO 500 720 1,00 220,00
        INFORMAÇÕES DO SCEE
        CRÉDITO RECEBIDO KWH 123,00 SALDO KWH: 1.250,50
        TOTAL 289,47
    ";

    const GROUP_A_TEXT: &str = "
        140753532 NOV/2025
        ENERGIA ATIVA-KWH PONTA 100 200 1,00 1.500,00
        ENERGIA ATIVA-KWH FORA PONTA 100 200 1,00 9.800,00
        ENERGIA ATIVA-KWH RESERVADO 100 200 1,00 0,00
        DEMANDA KW PONTA 1 2 1,00 120,00
        DEMANDA KW FORA PONTA 1 2 1,00 130,00
        DEMANDA KW RESERVADO 1 2 1,00 0,00
        ENERGIA GERAÇÃO-KWH PONTA 1 2 1,00 100,00
        ENERGIA GERAÇÃO-KWH FORA PONTA 1 2 1,00 50,00
        ENERGIA GERAÇÃO-KWH RESERVADO 1 2 1,00 25,00
        INFORMAÇÕES DO SCEE SALDO KWH P-10,00, FP-5,00, HR-0,00
        TOTAL R$ 12.345,67
    ";

    #[test]
    fn test_parse_group_b() {
        let result = TariffInvoiceParser::new().parse_document(GROUP_B_TEXT, "dez.pdf");
        let record = &result.record;

        assert_eq!(record.tariff_group, TariffGroup::B);
        assert_eq!(record.source_file_name, "dez.pdf");
        assert_eq!(record.consumer_unit_id, "140753532");
        assert_eq!(record.month, Some(Month::Dez));
        assert_eq!(record.year, 2025);
        assert_eq!(record.address, "RUA DAS FLORES, 123 - CENTRO");
        assert_eq!(record.previous_reading_date, "12/11/2025");
        assert_eq!(record.current_reading_date, "12/12/2025");
        assert_eq!(record.meter_id, "12345678-9");
        assert_eq!(record.previous_reading_value, 10450);
        assert_eq!(record.current_reading_value, 10800);
        assert_eq!(record.active_energy, 350.0);
        assert_eq!(record.generated_energy, 220.0);
        assert_eq!(record.credit_received, 123.0);
        assert_eq!(record.balance, 1250.5);
        assert_eq!(record.total_amount, 289.47);

        assert_eq!(result.report.table_version, "B-1");
        assert!(result.report.scee_found);
        assert!(result.report.missing().is_empty());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_parse_group_a() {
        let result = TariffInvoiceParser::new().parse(GROUP_A_TEXT);
        let record = &result.record;

        assert_eq!(record.tariff_group, TariffGroup::A);
        assert_eq!(record.consumption_peak, 1500.0);
        assert_eq!(record.consumption_off_peak, 9800.0);
        assert_eq!(record.demand_peak, 120.0);
        assert_eq!(record.demand_off_peak, 130.0);
        assert_eq!(record.generated_energy, 175.0);
        assert_eq!(record.balance, 15.0);
        assert_eq!(record.total_amount, 12345.67);
        assert_eq!(result.report.table_version, "A-3");

        let generation = &result.report.fields[&RecordField::GeneratedEnergy];
        assert_eq!(generation.hits.len(), 3);
    }

    #[test]
    fn test_partial_generation_sum() {
        let text = "FORA PONTA ENERGIA GERAÇÃO-KWH FORA PONTA 1 2 1,00 50,00";
        let result = TariffInvoiceParser::new().parse(text);
        assert_eq!(result.record.generated_energy, 50.0);
    }

    #[test]
    fn test_balance_falls_back_to_token_sum() {
        let text =
            "DEMANDA KW INFORMAÇÕES DO SCEE SALDO KWH 1.000,00 250,50 SALDO A EXPIRAR 99,00";
        let result = TariffInvoiceParser::new().parse(text);

        assert_eq!(result.record.balance, 1250.5);
        assert_eq!(
            result.report.fields[&RecordField::Balance].hits[0].rule,
            "balance_tokens"
        );
    }

    #[test]
    fn test_group_b_scee_rules_need_anchor() {
        let text = "CRÉDITO RECEBIDO KWH 123,00 SALDO KWH: 9,00 TOTAL 10,00";
        let result = TariffInvoiceParser::new().parse(text);

        assert_eq!(result.record.credit_received, 0.0);
        assert_eq!(result.record.balance, 0.0);
        assert_eq!(result.record.total_amount, 10.0);
        assert!(!result.report.scee_found);
        assert!(!result.report.is_matched(RecordField::Balance));
    }

    #[test]
    fn test_scee_window_excludes_later_section() {
        let text = format!(
            "INFORMAÇÕES DO SCEE {} SALDO KWH: 9,00",
            "X ".repeat(600)
        );
        let result = TariffInvoiceParser::new().parse(&text);
        assert_eq!(result.record.balance, 0.0);

        let wide = TariffInvoiceParser::new().with_scee_window(2000).parse(&text);
        assert_eq!(wide.record.balance, 9.0);
    }

    #[test]
    fn test_generation_cycle_fallback() {
        let text = "INFORMAÇÕES DO SCEE GERAÇÃO CICLO (11/2025) KWH UC 140753532 : 310,00";
        let result = TariffInvoiceParser::new().parse(text);

        assert_eq!(result.record.generated_energy, 310.0);
        assert_eq!(
            result.report.fields[&RecordField::GeneratedEnergy].hits[0].rule,
            "generation_cycle"
        );
    }

    #[test]
    fn test_unrecognized_text_yields_default_record() {
        let result = TariffInvoiceParser::new().parse("NOTHING TO SEE HERE");
        let record = &result.record;

        assert_eq!(record.consumer_unit_id, "");
        assert_eq!(record.month, None);
        assert_eq!(record.year, 0);
        assert_eq!(record.total_amount, 0.0);
        assert!(!result.warnings.is_empty());
        assert_eq!(result.report.matched_count(), 0);
    }

    #[test]
    fn test_empty_text() {
        let result = TariffInvoiceParser::new().parse("");
        assert_eq!(result.record, InvoiceRecord::empty(TariffGroup::B));
    }

    #[test]
    fn test_forced_group() {
        let result = TariffInvoiceParser::new()
            .with_group(GroupSelection::A)
            .parse(GROUP_B_TEXT);

        assert_eq!(result.record.tariff_group, TariffGroup::A);
        assert_eq!(result.record.active_energy, 0.0);
        assert!(result.record.historical_entries.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let parser = TariffInvoiceParser::new();
        let first = parser.parse(GROUP_A_TEXT);
        let second = parser.parse(GROUP_A_TEXT);

        assert_eq!(first.record, second.record);
        assert_eq!(first.report, second.report);
    }
}
