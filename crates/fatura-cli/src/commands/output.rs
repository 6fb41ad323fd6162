//! Record formatting shared by `process` and `batch`.

use serde_json::json;

use fatura_core::invoice::rules::format_br_number;
use fatura_core::{ExtractionResult, InvoiceRecord, RecordField, TariffGroup};

use super::process::OutputFormat;

/// File extension for an output format.
pub(crate) fn extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Text => "txt",
    }
}

pub(crate) fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    diagnostics: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if diagnostics => Ok(serde_json::to_string_pretty(&json!({
            "record": result.record,
            "report": result.report,
            "warnings": result.warnings,
        }))?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.record)?),
        OutputFormat::Csv => format_csv(&result.record),
        OutputFormat::Text => Ok(format_text(result, diagnostics)),
    }
}

/// CSV header: tariff group, then every record field.
pub(crate) fn csv_header() -> Vec<&'static str> {
    std::iter::once("tariffGroup")
        .chain(RecordField::ALL.iter().map(|f| f.name()))
        .collect()
}

pub(crate) fn csv_row(record: &InvoiceRecord) -> Vec<String> {
    std::iter::once(record.tariff_group.to_string())
        .chain(RecordField::ALL.iter().map(|f| record.get(*f).to_string()))
        .collect()
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(csv_header())?;
    wtr.write_record(csv_row(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, diagnostics: bool) -> String {
    let record = &result.record;
    let mut output = String::new();

    let month = record.month.map(|m| m.code()).unwrap_or("???");
    output.push_str(&format!(
        "UC {} - {}/{} (group {}, table {})\n",
        record.consumer_unit_id,
        month,
        record.year,
        record.tariff_group,
        result.report.table_version
    ));
    output.push_str(&format!("Address: {}\n", record.address));
    output.push_str(&format!(
        "Readings: {} -> {}\n",
        record.previous_reading_date, record.current_reading_date
    ));
    output.push('\n');

    match record.tariff_group {
        TariffGroup::B => {
            output.push_str(&format!(
                "Meter {}: {} -> {}\n",
                record.meter_id, record.previous_reading_value, record.current_reading_value
            ));
            output.push_str(&format!(
                "  Active energy:    {} kWh\n",
                format_br_number(record.active_energy)
            ));
        }
        TariffGroup::A => {
            output.push_str("Consumption (kWh):\n");
            output.push_str(&format!(
                "  Peak:             {}\n",
                format_br_number(record.consumption_peak)
            ));
            output.push_str(&format!(
                "  Off-peak:         {}\n",
                format_br_number(record.consumption_off_peak)
            ));
            output.push_str(&format!(
                "  Reserved:         {}\n",
                format_br_number(record.consumption_reserved)
            ));
            output.push_str("Demand (kW):\n");
            output.push_str(&format!(
                "  Peak:             {}\n",
                format_br_number(record.demand_peak)
            ));
            output.push_str(&format!(
                "  Off-peak:         {}\n",
                format_br_number(record.demand_off_peak)
            ));
            output.push_str(&format!(
                "  Reserved:         {}\n",
                format_br_number(record.demand_reserved)
            ));
        }
    }

    output.push_str(&format!(
        "  Generated energy: {} kWh\n",
        format_br_number(record.generated_energy)
    ));
    output.push_str(&format!(
        "  Credit received:  {} kWh\n",
        format_br_number(record.credit_received)
    ));
    output.push_str(&format!("  Balance:          {} kWh\n", format_br_number(record.balance)));
    output.push_str(&format!("\nTotal: R$ {}\n", format_br_number(record.total_amount)));

    if !record.historical_entries.is_empty() {
        output.push_str(&format!("\nHistory: {} months\n", record.historical_entries.len()));
    }

    if diagnostics {
        output.push_str(&format!(
            "\nMatched {}/{} fields\n",
            result.report.matched_count(),
            result.report.fields.len()
        ));
        for field in result.report.missing() {
            output.push_str(&format!("  missing: {}\n", field));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_header_matches_row() {
        let record = InvoiceRecord::empty(TariffGroup::B);
        assert_eq!(csv_header().len(), csv_row(&record).len());
        assert_eq!(csv_header()[1], "consumerUnitId");
    }
}
