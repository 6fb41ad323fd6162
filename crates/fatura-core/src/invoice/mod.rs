//! Invoice field extraction module.

mod diagnostics;
pub mod layout;
mod parser;
pub mod rules;

pub use diagnostics::{FieldMatch, MatchReport, RuleHit};
pub use layout::{table_for, FieldSpec, FieldTable};
pub use parser::{ExtractionResult, InvoiceParser, TariffInvoiceParser};
