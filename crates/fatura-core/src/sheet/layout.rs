//! Column layout of the generator sheet, per tariff group.

use crate::models::record::{Month, RecordField, TariffGroup};

/// Which column receives each record field on a month row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub group: TariffGroup,
    pub columns: Vec<(RecordField, &'static str)>,
}

const GROUP_B_COLUMNS: &[(RecordField, &str)] = &[
    (RecordField::PreviousReadingDate, "B"),
    (RecordField::CurrentReadingDate, "C"),
    (RecordField::GeneratedEnergy, "I"),
    (RecordField::CreditReceived, "J"),
    (RecordField::ActiveEnergy, "K"),
    (RecordField::TotalAmount, "N"),
    (RecordField::Balance, "P"),
    (RecordField::MeterId, "R"),
    (RecordField::PreviousReadingValue, "S"),
    (RecordField::CurrentReadingValue, "T"),
];

const GROUP_A_COLUMNS: &[(RecordField, &str)] = &[
    (RecordField::PreviousReadingDate, "B"),
    (RecordField::CurrentReadingDate, "C"),
    (RecordField::ConsumptionPeak, "D"),
    (RecordField::ConsumptionOffPeak, "E"),
    (RecordField::ConsumptionReserved, "F"),
    (RecordField::DemandPeak, "G"),
    (RecordField::DemandOffPeak, "H"),
    (RecordField::DemandReserved, "L"),
    (RecordField::GeneratedEnergy, "I"),
    (RecordField::CreditReceived, "J"),
    (RecordField::TotalAmount, "N"),
    (RecordField::Balance, "P"),
];

impl SheetLayout {
    pub fn for_group(group: TariffGroup) -> Self {
        let columns = match group {
            TariffGroup::A => GROUP_A_COLUMNS,
            TariffGroup::B => GROUP_B_COLUMNS,
        };
        Self {
            group,
            columns: columns.to_vec(),
        }
    }

    /// Row label of a month as printed in the label column.
    pub fn month_label(month: Month) -> String {
        month.label()
    }

    pub fn column_of(&self, field: RecordField) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, column)| *column)
    }
}
