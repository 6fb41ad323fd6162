use fatura_core::invoice::rules::normalize_text;
use fatura_core::models::config::SheetConfig;
use fatura_core::sheet::{Workbook, Worksheet};
use fatura_core::{
    write_batch, FieldValue, InvoiceParser, MemoryWorkbook, Month, RecordField, ReservedColumn,
    TariffGroup, TariffInvoiceParser,
};
use pretty_assertions::assert_eq;

const GROUP_B: &str = include_str!("fixtures/group_b.txt");
const GROUP_A: &str = include_str!("fixtures/group_a.txt");

#[test]
fn group_b_identification_and_address() {
    let record = TariffInvoiceParser::new().parse(GROUP_B).record;

    assert_eq!(record.tariff_group, TariffGroup::B);
    assert_eq!(record.consumer_unit_id, "140753532");
    assert_eq!(record.month, Some(Month::Dez));
    assert_eq!(record.year, 2025);
    assert_eq!(record.address, "RUA DAS FLORES, 123 - CENTRO TERESINA - PI");
}

#[test]
fn group_b_readings_and_meter() {
    let record = TariffInvoiceParser::new().parse(GROUP_B).record;

    assert_eq!(record.previous_reading_date, "12/11/2025");
    assert_eq!(record.current_reading_date, "12/12/2025");
    assert_eq!(record.meter_id, "12345678-9");
    assert_eq!(record.previous_reading_value, 10450);
    assert_eq!(record.current_reading_value, 10800);
    assert_eq!(record.active_energy, 350.0);
    assert_eq!(record.generated_energy, 220.0);
}

#[test]
fn group_b_scee_block_and_total() {
    let result = TariffInvoiceParser::new().parse(GROUP_B);

    // The later "crédito recebido" line is ignored: first match wins
    assert_eq!(result.record.credit_received, 123.0);
    assert_eq!(result.record.balance, 1250.5);
    assert_eq!(result.record.total_amount, 289.47);
    assert!(result.report.scee_found);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
}

#[test]
fn group_a_periods_and_generation() {
    let result = TariffInvoiceParser::new().parse(GROUP_A);
    let record = &result.record;

    assert_eq!(record.tariff_group, TariffGroup::A);
    assert_eq!(record.consumer_unit_id, "140753533");
    assert_eq!(record.month, Some(Month::Nov));
    assert_eq!(record.consumption_peak, 1500.0);
    assert_eq!(record.consumption_off_peak, 9800.0);
    assert_eq!(record.consumption_reserved, 0.0);
    assert_eq!(record.demand_peak, 120.0);
    assert_eq!(record.demand_off_peak, 130.0);
    assert_eq!(record.generated_energy, 175.0);
    assert_eq!(record.credit_received, 175.0);
    assert_eq!(record.balance, 15.0);
    assert_eq!(record.total_amount, 12345.67);

    // Group A has no single-class meter line
    assert_eq!(record.meter_id, "");
    assert!(!result.report.fields.contains_key(&RecordField::MeterId));
}

#[test]
fn group_a_history_rows() {
    let result = TariffInvoiceParser::new().parse(GROUP_A);
    let history = &result.record.historical_entries;

    let months: Vec<Month> = history.iter().map(|e| e.month).collect();
    assert_eq!(
        months,
        vec![
            Month::Out,
            Month::Set,
            Month::Ago,
            Month::Jul,
            Month::Jun,
            Month::Mai,
            Month::Abr,
            Month::Mar,
        ]
    );
    assert_eq!(result.report.history_rows, 8);
    assert_eq!(result.report.discarded_history_rows, 1);

    let first = &history[0];
    assert_eq!(first.year, 2025);
    assert_eq!(first.demand_peak, 118.0);
    assert_eq!(first.consumption_off_peak, 9650.0);
    assert_eq!(first.consumption_reserved, 0.0);
    assert_eq!(first.reserved_column, 31.0);
}

#[test]
fn group_a_history_with_seventh_column() {
    let record = TariffInvoiceParser::new()
        .with_reserved_column(ReservedColumn::Seventh)
        .parse(GROUP_A)
        .record;

    assert_eq!(record.historical_entries[1].consumption_reserved, 30.0);
}

#[test]
fn extraction_is_idempotent() {
    let parser = TariffInvoiceParser::new();
    for text in [GROUP_A, GROUP_B] {
        assert_eq!(parser.parse(text).record, parser.parse(text).record);
    }
}

#[test]
fn normalization_is_stable() {
    let once = normalize_text(GROUP_B);
    assert_eq!(normalize_text(&once), once);
    assert!(!once.contains('\n'));
}

#[test]
fn field_map_uses_external_names() {
    let record = TariffInvoiceParser::new().parse(GROUP_B).record;
    let map = record.to_field_map();

    assert_eq!(map["month"], FieldValue::Text("DEZ".to_string()));
    assert_eq!(map["year"], FieldValue::Integer(2025));
    assert_eq!(map["totalAmount"], FieldValue::Number(289.47));
    assert_eq!(map.len(), RecordField::ALL.len());
}

#[test]
fn records_fill_balance_workbook() {
    let parser = TariffInvoiceParser::new();
    let records = vec![
        parser.parse_document(GROUP_B, "dez.txt").record,
        parser.parse_document("SEM DADOS", "vazio.txt").record,
    ];

    let config = SheetConfig::default();
    let mut workbook = MemoryWorkbook::template(&config).unwrap();
    let report = write_batch(&mut workbook, &records, &config).unwrap();

    assert_eq!(report.rows, vec![(Month::Dez, 16)]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].source_file_name, "vazio.txt");

    let generator = workbook.sheet("UC GERADORA").unwrap();
    assert_eq!(
        generator.get("P16".parse().unwrap()),
        Some(&FieldValue::Number(1250.5))
    );
    assert_eq!(
        generator.get("B16".parse().unwrap()),
        Some(&FieldValue::Text("12/11/2025".to_string()))
    );
}
