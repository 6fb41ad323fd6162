//! Invoice record models shared by the extractor and the workbook writer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

/// Billing month as printed on the invoices (Portuguese three-letter codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Month {
    Jan,
    Fev,
    Mar,
    Abr,
    Mai,
    Jun,
    Jul,
    Ago,
    Set,
    Out,
    Nov,
    Dez,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Fev,
        Month::Mar,
        Month::Abr,
        Month::Mai,
        Month::Jun,
        Month::Jul,
        Month::Ago,
        Month::Set,
        Month::Out,
        Month::Nov,
        Month::Dez,
    ];

    /// Canonical upper-case code (`JAN`, `FEV`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Fev => "FEV",
            Month::Mar => "MAR",
            Month::Abr => "ABR",
            Month::Mai => "MAI",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Ago => "AGO",
            Month::Set => "SET",
            Month::Out => "OUT",
            Month::Nov => "NOV",
            Month::Dez => "DEZ",
        }
    }

    /// Parse a canonical month code. Anything else is unresolved.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(code))
    }

    /// Calendar month number (1-12).
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Title-case label used in the spreadsheet row labels (`Jan`, `Fev`, ...).
    pub fn label(self) -> String {
        let code = self.code();
        format!("{}{}", &code[..1], code[1..].to_lowercase())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Tariff layout of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TariffGroup {
    /// Time-of-use billing (peak / off-peak / reserved, with demand).
    A,
    /// Single-class billing.
    #[default]
    B,
}

impl TariffGroup {
    /// Guess the group from normalized invoice text.
    ///
    /// Time-of-use invoices always print per-period rows, so the presence of an
    /// off-peak or demand label is enough to pick Group A.
    pub fn detect(normalized: &str) -> Self {
        if normalized.contains("FORA PONTA") || normalized.contains("DEMANDA KW") {
            TariffGroup::A
        } else {
            TariffGroup::B
        }
    }
}

impl fmt::Display for TariffGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TariffGroup::A => f.write_str("A"),
            TariffGroup::B => f.write_str("B"),
        }
    }
}

/// One structured record per processed invoice.
///
/// Every numeric field is `0` when its pattern did not match; use the
/// extraction's `MatchReport` to tell a miss from a real zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// Field table the record was extracted with.
    pub tariff_group: TariffGroup,

    /// Consumer unit (UC) identifier.
    pub consumer_unit_id: String,

    /// Reference month, `None` when unresolved (serialized as `""`).
    #[serde(with = "month_or_empty")]
    pub month: Option<Month>,

    /// Four-digit reference year, `0` when unresolved.
    pub year: i32,

    /// Delivery address.
    pub address: String,

    /// Name of the document the text came from.
    pub source_file_name: String,

    pub meter_id: String,
    pub previous_reading_date: String,
    pub current_reading_date: String,
    pub previous_reading_value: i64,
    pub current_reading_value: i64,

    /// Single-class active energy (kWh).
    pub active_energy: f64,
    pub generated_energy: f64,
    pub credit_received: f64,
    pub balance: f64,
    pub total_amount: f64,

    pub consumption_peak: f64,
    pub consumption_off_peak: f64,
    pub consumption_reserved: f64,
    pub demand_peak: f64,
    pub demand_off_peak: f64,
    pub demand_reserved: f64,

    /// Monthly history table (Group A only), in source order.
    #[serde(default)]
    pub historical_entries: Vec<HistoricalEntry>,
}

/// A row of the Group-A consumption history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEntry {
    pub month: Month,
    /// Four-digit year (two-digit source years map into the 2000s).
    pub year: i32,
    pub demand_peak: f64,
    pub demand_off_peak: f64,
    pub demand_reserved: f64,
    pub consumption_peak: f64,
    pub consumption_off_peak: f64,
    pub consumption_reserved: f64,
    /// Seventh numeric column of the row, whatever the configured mapping.
    pub reserved_column: f64,
}

/// Addressable scalar fields of an [`InvoiceRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordField {
    ConsumerUnitId,
    Month,
    Year,
    Address,
    SourceFileName,
    MeterId,
    PreviousReadingDate,
    CurrentReadingDate,
    PreviousReadingValue,
    CurrentReadingValue,
    ActiveEnergy,
    GeneratedEnergy,
    CreditReceived,
    Balance,
    TotalAmount,
    ConsumptionPeak,
    ConsumptionOffPeak,
    ConsumptionReserved,
    DemandPeak,
    DemandOffPeak,
    DemandReserved,
}

impl RecordField {
    pub const ALL: [RecordField; 21] = [
        RecordField::ConsumerUnitId,
        RecordField::Month,
        RecordField::Year,
        RecordField::Address,
        RecordField::SourceFileName,
        RecordField::MeterId,
        RecordField::PreviousReadingDate,
        RecordField::CurrentReadingDate,
        RecordField::PreviousReadingValue,
        RecordField::CurrentReadingValue,
        RecordField::ActiveEnergy,
        RecordField::GeneratedEnergy,
        RecordField::CreditReceived,
        RecordField::Balance,
        RecordField::TotalAmount,
        RecordField::ConsumptionPeak,
        RecordField::ConsumptionOffPeak,
        RecordField::ConsumptionReserved,
        RecordField::DemandPeak,
        RecordField::DemandOffPeak,
        RecordField::DemandReserved,
    ];

    /// Stable external field name.
    pub fn name(self) -> &'static str {
        match self {
            RecordField::ConsumerUnitId => "consumerUnitId",
            RecordField::Month => "month",
            RecordField::Year => "year",
            RecordField::Address => "address",
            RecordField::SourceFileName => "sourceFileName",
            RecordField::MeterId => "meterId",
            RecordField::PreviousReadingDate => "previousReadingDate",
            RecordField::CurrentReadingDate => "currentReadingDate",
            RecordField::PreviousReadingValue => "previousReadingValue",
            RecordField::CurrentReadingValue => "currentReadingValue",
            RecordField::ActiveEnergy => "activeEnergy",
            RecordField::GeneratedEnergy => "generatedEnergy",
            RecordField::CreditReceived => "creditReceived",
            RecordField::Balance => "balance",
            RecordField::TotalAmount => "totalAmount",
            RecordField::ConsumptionPeak => "consumptionPeak",
            RecordField::ConsumptionOffPeak => "consumptionOffPeak",
            RecordField::ConsumptionReserved => "consumptionReserved",
            RecordField::DemandPeak => "demandPeak",
            RecordField::DemandOffPeak => "demandOffPeak",
            RecordField::DemandReserved => "demandReserved",
        }
    }
}

impl Serialize for RecordField {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field value as handed to the spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl InvoiceRecord {
    /// Record with every field at its default, for the given table.
    pub fn empty(tariff_group: TariffGroup) -> Self {
        Self {
            tariff_group,
            consumer_unit_id: String::new(),
            month: None,
            year: 0,
            address: String::new(),
            source_file_name: String::new(),
            meter_id: String::new(),
            previous_reading_date: String::new(),
            current_reading_date: String::new(),
            previous_reading_value: 0,
            current_reading_value: 0,
            active_energy: 0.0,
            generated_energy: 0.0,
            credit_received: 0.0,
            balance: 0.0,
            total_amount: 0.0,
            consumption_peak: 0.0,
            consumption_off_peak: 0.0,
            consumption_reserved: 0.0,
            demand_peak: 0.0,
            demand_off_peak: 0.0,
            demand_reserved: 0.0,
            historical_entries: Vec::new(),
        }
    }

    /// Look up a field by its external identity.
    pub fn get(&self, field: RecordField) -> FieldValue {
        use FieldValue::{Integer, Number, Text};

        match field {
            RecordField::ConsumerUnitId => Text(self.consumer_unit_id.clone()),
            RecordField::Month => Text(self.month.map(Month::code).unwrap_or("").to_string()),
            RecordField::Year => Integer(i64::from(self.year)),
            RecordField::Address => Text(self.address.clone()),
            RecordField::SourceFileName => Text(self.source_file_name.clone()),
            RecordField::MeterId => Text(self.meter_id.clone()),
            RecordField::PreviousReadingDate => Text(self.previous_reading_date.clone()),
            RecordField::CurrentReadingDate => Text(self.current_reading_date.clone()),
            RecordField::PreviousReadingValue => Integer(self.previous_reading_value),
            RecordField::CurrentReadingValue => Integer(self.current_reading_value),
            RecordField::ActiveEnergy => Number(self.active_energy),
            RecordField::GeneratedEnergy => Number(self.generated_energy),
            RecordField::CreditReceived => Number(self.credit_received),
            RecordField::Balance => Number(self.balance),
            RecordField::TotalAmount => Number(self.total_amount),
            RecordField::ConsumptionPeak => Number(self.consumption_peak),
            RecordField::ConsumptionOffPeak => Number(self.consumption_off_peak),
            RecordField::ConsumptionReserved => Number(self.consumption_reserved),
            RecordField::DemandPeak => Number(self.demand_peak),
            RecordField::DemandOffPeak => Number(self.demand_off_peak),
            RecordField::DemandReserved => Number(self.demand_reserved),
        }
    }

    /// Mutable slot for a floating-point field, `None` for non-numeric fields.
    pub(crate) fn number_slot(&mut self, field: RecordField) -> Option<&mut f64> {
        match field {
            RecordField::ActiveEnergy => Some(&mut self.active_energy),
            RecordField::GeneratedEnergy => Some(&mut self.generated_energy),
            RecordField::CreditReceived => Some(&mut self.credit_received),
            RecordField::Balance => Some(&mut self.balance),
            RecordField::TotalAmount => Some(&mut self.total_amount),
            RecordField::ConsumptionPeak => Some(&mut self.consumption_peak),
            RecordField::ConsumptionOffPeak => Some(&mut self.consumption_off_peak),
            RecordField::ConsumptionReserved => Some(&mut self.consumption_reserved),
            RecordField::DemandPeak => Some(&mut self.demand_peak),
            RecordField::DemandOffPeak => Some(&mut self.demand_off_peak),
            RecordField::DemandReserved => Some(&mut self.demand_reserved),
            _ => None,
        }
    }

    /// Field-name to value mapping handed to the spreadsheet writer.
    pub fn to_field_map(&self) -> BTreeMap<&'static str, FieldValue> {
        RecordField::ALL
            .into_iter()
            .map(|field| (field.name(), self.get(field)))
            .collect()
    }

    /// Check the record for shape problems and return any issues found.
    ///
    /// Issues are informational: a record with issues is still written.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.consumer_unit_id.is_empty() {
            issues.push("Missing consumer unit id".to_string());
        }

        if self.month.is_none() {
            issues.push("Unresolved reference month".to_string());
        }

        let previous = parse_reading_date(&self.previous_reading_date);
        let current = parse_reading_date(&self.current_reading_date);
        match (previous, current) {
            (Some(prev), Some(curr)) if prev > curr => {
                issues.push(format!(
                    "Previous reading date ({}) is after current reading date ({})",
                    self.previous_reading_date, self.current_reading_date
                ));
            }
            (Some(_), Some(_)) => {}
            _ if self.previous_reading_date.is_empty() && self.current_reading_date.is_empty() => {
                issues.push("Missing reading dates".to_string());
            }
            _ => {
                issues.push(format!(
                    "Unparseable reading dates ({} / {})",
                    self.previous_reading_date, self.current_reading_date
                ));
            }
        }

        if self.current_reading_value < self.previous_reading_value {
            issues.push(format!(
                "Current meter reading ({}) is below previous reading ({})",
                self.current_reading_value, self.previous_reading_value
            ));
        }

        if self.total_amount == 0.0 {
            issues.push("Total amount is zero".to_string());
        }

        issues
    }
}

fn parse_reading_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%d/%m/%Y").ok()
}

/// Serializes `Option<Month>` as its code, or `""` when unresolved.
mod month_or_empty {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Month;

    pub fn serialize<S: Serializer>(month: &Option<Month>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(month.map(Month::code).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Month>, D::Error> {
        let code = String::deserialize(d)?;
        Ok(Month::from_code(&code))
    }
}
