//! Per-field match diagnostics.
//!
//! Extraction never fails, so a field at `0` may be a real zero or a pattern
//! that found nothing. The report keeps that distinction.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::record::{RecordField, TariffGroup};

/// A rule that produced a value, with the raw text it read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleHit {
    pub rule: &'static str,
    pub raw: String,
}

/// Match status of one record field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldMatch {
    pub matched: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hits: Vec<RuleHit>,
}

/// Which fields matched during one extraction, and through which rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub tariff_group: TariffGroup,
    /// Field table version, e.g. `B-1`.
    pub table_version: String,
    /// Whether the SCEE anchor was present.
    pub scee_found: bool,
    pub fields: BTreeMap<RecordField, FieldMatch>,
    pub history_rows: usize,
    pub discarded_history_rows: usize,
}

impl MatchReport {
    pub fn new(tariff_group: TariffGroup, table_version: impl Into<String>) -> Self {
        Self {
            tariff_group,
            table_version: table_version.into(),
            scee_found: false,
            fields: BTreeMap::new(),
            history_rows: 0,
            discarded_history_rows: 0,
        }
    }

    /// Register a field the extraction is expected to fill.
    pub fn expect(&mut self, field: RecordField) {
        self.fields.entry(field).or_default();
    }

    /// Record a rule hit for `field`.
    pub fn hit(&mut self, field: RecordField, rule: &'static str, raw: impl Into<String>) {
        let entry = self.fields.entry(field).or_default();
        entry.matched = true;
        entry.hits.push(RuleHit {
            rule,
            raw: raw.into(),
        });
    }

    pub fn is_matched(&self, field: RecordField) -> bool {
        self.fields.get(&field).is_some_and(|f| f.matched)
    }

    /// Expected fields that no rule matched, in field order.
    pub fn missing(&self) -> Vec<RecordField> {
        self.fields
            .iter()
            .filter(|(_, m)| !m.matched)
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn matched_count(&self) -> usize {
        self.fields.values().filter(|m| m.matched).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_fields_start_unmatched() {
        let mut report = MatchReport::new(TariffGroup::B, "B-1");
        report.expect(RecordField::Balance);
        report.expect(RecordField::TotalAmount);
        report.hit(RecordField::TotalAmount, "total", "45,10");

        assert!(!report.is_matched(RecordField::Balance));
        assert!(report.is_matched(RecordField::TotalAmount));
        assert!(!report.is_matched(RecordField::MeterId));
        assert_eq!(report.missing(), vec![RecordField::Balance]);
        assert_eq!(report.matched_count(), 1);
    }

    #[test]
    fn test_hits_accumulate() {
        let mut report = MatchReport::new(TariffGroup::A, "A-3");
        report.hit(RecordField::GeneratedEnergy, "generation_peak", "10,00");
        report.hit(RecordField::GeneratedEnergy, "generation_off_peak", "20,00");

        let field = &report.fields[&RecordField::GeneratedEnergy];
        assert_eq!(field.hits.len(), 2);
        assert_eq!(field.hits[1].rule, "generation_off_peak");
    }

    #[test]
    fn test_serializes_with_field_names() {
        let mut report = MatchReport::new(TariffGroup::B, "B-1");
        report.hit(RecordField::CreditReceived, "credit_received", "123,00");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tableVersion"], "B-1");
        assert_eq!(json["fields"]["creditReceived"]["matched"], true);
        assert_eq!(json["fields"]["creditReceived"]["hits"][0]["raw"], "123,00");
    }
}
