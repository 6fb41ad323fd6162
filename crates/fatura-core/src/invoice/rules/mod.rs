//! Rule-based field extractors for energy invoices.
//!
//! Every extractor operates on text produced by [`normalize_text`]: a single
//! upper-case line with whitespace runs collapsed.

pub mod history;
pub mod identification;
pub mod numbers;
pub mod patterns;
pub mod readings;
pub mod scee;
pub mod text;

pub use history::{HistoryExtractor, HistoryTable};
pub use identification::{AddressExtractor, Identification, IdentificationExtractor};
pub use numbers::{format_br_number, parse_br_number, sum_br_numbers};
pub use readings::{MeterExtractor, MeterReading, ReadingDates, ReadingDatesExtractor};
pub use scee::{char_window, scee_window, segment_until};
pub use text::normalize_text;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text (first match in scan order).
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all non-overlapping occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value together with the text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span in the searched text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
