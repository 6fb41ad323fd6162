//! Declarative field tables, one per tariff group.
//!
//! A table lists, for each numeric field of the record, the label pattern that
//! finds it, where to search, how to turn the captures into a number and how
//! to combine it with what earlier rules already wrote. Adding a layout
//! revision means adding rules here, not writing a new extractor.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::record::{RecordField, TariffGroup};

use super::rules::numbers::{parse_br_number, sum_br_numbers};
use super::rules::scee::segment_until;

/// Default SCEE window for single-class invoices (characters).
pub const GROUP_B_SCEE_WINDOW: usize = 1000;

/// Default SCEE window for time-of-use invoices (characters).
pub const GROUP_A_SCEE_WINDOW: usize = 800;

/// Where a rule searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The whole normalized text.
    Document,
    /// The SCEE window. When the anchor is absent the rule is skipped if
    /// `required`, otherwise it searches the whole text.
    Scee { required: bool },
}

/// How captures become a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// First capture group of the first match.
    First,
    /// Sum of every capture group of the first match.
    SumGroups,
    /// Sum of every decimal token between the match and the earliest stop label.
    SumTokensUntil(&'static [&'static str]),
}

/// How a hit combines with the current field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Overwrite the field.
    Set,
    /// Add to the field.
    Add,
    /// Only when no earlier rule matched the field.
    IfUnmatched,
    /// Only when the field is still zero.
    IfZero,
}

/// A single label -> pattern -> field rule.
#[derive(Debug)]
pub struct FieldSpec {
    /// Target field.
    pub field: RecordField,
    /// Rule name used in diagnostics.
    pub rule: &'static str,
    pub pattern: Regex,
    pub scope: Scope,
    pub capture: Capture,
    pub merge: Merge,
}

/// A rule hit: the value and the raw text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHit {
    pub value: f64,
    pub raw: String,
}

impl FieldSpec {
    fn new(field: RecordField, rule: &'static str, pattern: &str) -> Self {
        Self {
            field,
            rule,
            pattern: Regex::new(pattern).unwrap(),
            scope: Scope::Document,
            capture: Capture::First,
            merge: Merge::Set,
        }
    }

    fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    fn merge(mut self, merge: Merge) -> Self {
        self.merge = merge;
        self
    }

    /// Run the rule against already-scoped text.
    pub fn apply(&self, text: &str) -> Option<SpecHit> {
        match self.capture {
            Capture::First => {
                let caps = self.pattern.captures(text)?;
                let raw = caps.get(1)?.as_str();
                Some(SpecHit {
                    value: parse_br_number(raw),
                    raw: raw.to_string(),
                })
            }
            Capture::SumGroups => {
                let caps = self.pattern.captures(text)?;
                let parts: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
                Some(SpecHit {
                    value: parts.iter().map(|p| parse_br_number(p)).sum(),
                    raw: parts.join(" + "),
                })
            }
            Capture::SumTokensUntil(stops) => {
                let label = self.pattern.find(text)?;
                let segment = segment_until(&text[label.start()..], label.as_str(), stops)?;
                Some(SpecHit {
                    value: sum_br_numbers(segment),
                    raw: segment.trim().to_string(),
                })
            }
        }
    }
}

/// Versioned rule set for one tariff group.
#[derive(Debug)]
pub struct FieldTable {
    pub group: TariffGroup,
    /// Layout revision, bumped whenever the rules change meaning.
    pub revision: u32,
    /// Characters searched after the SCEE anchor.
    pub scee_window: usize,
    /// Whether the single-class meter line is read.
    pub reads_meter: bool,
    /// Whether the consumption history table is read.
    pub reads_history: bool,
    pub specs: Vec<FieldSpec>,
}

impl FieldTable {
    /// Version tag such as `A-3`.
    pub fn version(&self) -> String {
        self.to_string()
    }

    /// Every field the table's rules can write.
    pub fn fields(&self) -> Vec<RecordField> {
        let mut fields: Vec<RecordField> = self.specs.iter().map(|s| s.field).collect();
        fields.sort();
        fields.dedup();
        fields
    }
}

impl fmt::Display for FieldTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.group, self.revision)
    }
}

/// Numeric row of a labeled register: `<label> <int> <int> <factor> <value>`.
fn register_row(label: &str) -> String {
    format!(r"{}\s+\d+\s+\d+\s+[\d.,]+\s+([\d.,]+)", label)
}

const CREDIT_RECEIVED: &str = r"CRÉDITO RECEBIDO.*?(\d[\d.]*,\d+)";
const BALANCE_STOPS: &[&str] = &["SALDO A EXPIRAR", "TOTAL"];

lazy_static! {
    /// Single-class invoices.
    pub static ref GROUP_B_TABLE: FieldTable = FieldTable {
        group: TariffGroup::B,
        revision: 1,
        scee_window: GROUP_B_SCEE_WINDOW,
        reads_meter: true,
        reads_history: false,
        specs: vec![
            FieldSpec::new(
                RecordField::ActiveEnergy,
                "active_energy",
                &register_row(r"ENERGIA ATIVA\s*-\s*KWH ÚNICO"),
            ),
            FieldSpec::new(
                RecordField::GeneratedEnergy,
                "generation_register",
                &register_row(r"ENERGIA GERAÇÃO\s*-\s*KWH ÚNICO"),
            ),
            FieldSpec::new(
                RecordField::GeneratedEnergy,
                "generation_cycle",
                r"GERAÇÃO CICLO.*?UC\s+\d+\s*:\s*([\d.,]+)",
            )
            .scope(Scope::Scee { required: true })
            .merge(Merge::IfZero),
            FieldSpec::new(RecordField::CreditReceived, "credit_received", CREDIT_RECEIVED)
                .scope(Scope::Scee { required: true }),
            FieldSpec::new(
                RecordField::Balance,
                "balance",
                r"SALDO KWH\s*[:=]?\s*(\d[\d.]*,\d{2})",
            )
            .scope(Scope::Scee { required: true }),
            FieldSpec::new(RecordField::TotalAmount, "total", r"\bTOTAL\s+(\d[\d.]*,\d+)"),
        ],
    };

    /// Time-of-use invoices.
    pub static ref GROUP_A_TABLE: FieldTable = FieldTable {
        group: TariffGroup::A,
        revision: 3,
        scee_window: GROUP_A_SCEE_WINDOW,
        reads_meter: false,
        reads_history: true,
        specs: vec![
            FieldSpec::new(
                RecordField::ConsumptionPeak,
                "consumption_peak",
                &register_row(r"ENERGIA ATIVA\s*-\s*KWH\s+PONTA"),
            ),
            FieldSpec::new(
                RecordField::ConsumptionOffPeak,
                "consumption_off_peak",
                &register_row(r"ENERGIA ATIVA\s*-\s*KWH\s+FORA PONTA"),
            ),
            FieldSpec::new(
                RecordField::ConsumptionReserved,
                "consumption_reserved",
                &register_row(r"ENERGIA ATIVA\s*-\s*KWH\s+RESERVADO"),
            ),
            FieldSpec::new(
                RecordField::DemandPeak,
                "demand_peak",
                &register_row(r"DEMANDA KW\s+PONTA"),
            ),
            FieldSpec::new(
                RecordField::DemandOffPeak,
                "demand_off_peak",
                &register_row(r"DEMANDA KW\s+FORA PONTA"),
            ),
            FieldSpec::new(
                RecordField::DemandReserved,
                "demand_reserved",
                &register_row(r"DEMANDA KW\s+RESERVADO"),
            ),
            FieldSpec::new(
                RecordField::GeneratedEnergy,
                "generation_peak",
                &register_row(r"ENERGIA GERAÇÃO\s*-\s*KWH\s+PONTA"),
            )
            .merge(Merge::Add),
            FieldSpec::new(
                RecordField::GeneratedEnergy,
                "generation_off_peak",
                &register_row(r"ENERGIA GERAÇÃO\s*-\s*KWH\s+FORA PONTA"),
            )
            .merge(Merge::Add),
            FieldSpec::new(
                RecordField::GeneratedEnergy,
                "generation_reserved",
                &register_row(r"ENERGIA GERAÇÃO\s*-\s*KWH\s+RESERVADO"),
            )
            .merge(Merge::Add),
            FieldSpec::new(RecordField::CreditReceived, "credit_received", CREDIT_RECEIVED)
                .scope(Scope::Scee { required: false }),
            FieldSpec::new(
                RecordField::Balance,
                "balance_by_period",
                r"SALDO KWH\s*[:=]?\s*P\s*-\s*(\d[\d.]*,\d{2})\s*,?\s*FP\s*-\s*(\d[\d.]*,\d{2})\s*,?\s*HR\s*-\s*(\d[\d.]*,\d{2})",
            )
            .scope(Scope::Scee { required: false })
            .capture(Capture::SumGroups),
            FieldSpec::new(RecordField::Balance, "balance_tokens", r"SALDO KWH")
                .scope(Scope::Scee { required: false })
                .capture(Capture::SumTokensUntil(BALANCE_STOPS))
                .merge(Merge::IfUnmatched),
            FieldSpec::new(
                RecordField::TotalAmount,
                "total",
                r"\bTOTAL\s+(?:R\$\s*)?(\d[\d.]*,\d{2})",
            ),
        ],
    };
}

/// Current field table for a tariff group.
pub fn table_for(group: TariffGroup) -> &'static FieldTable {
    match group {
        TariffGroup::A => &GROUP_A_TABLE,
        TariffGroup::B => &GROUP_B_TABLE,
    }
}
