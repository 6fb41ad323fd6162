//! Reading dates and meter registers.

use super::patterns::{METER_LINE, READING_DATES};
use super::{ExtractionMatch, FieldExtractor};

/// Previous and current reading dates, kept as printed (`DD/MM/YYYY`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingDates {
    pub previous: String,
    pub current: String,
}

/// Reading date extractor.
#[derive(Debug, Default)]
pub struct ReadingDatesExtractor;

impl ReadingDatesExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for ReadingDatesExtractor {
    type Output = ExtractionMatch<ReadingDates>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in READING_DATES.captures_iter(text) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };
            results.push(
                ExtractionMatch::new(
                    ReadingDates {
                        previous: caps[1].to_string(),
                        current: caps[2].to_string(),
                    },
                    full_match.as_str(),
                )
                .with_position(full_match.start(), full_match.end()),
            );
        }

        results
    }
}

/// Meter id and its previous/current register values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterReading {
    pub meter_id: String,
    pub previous: i64,
    pub current: i64,
}

/// Extracts `<meter>-<digit> ENERGIA ATIVA - KWH ÚNICO <int> <int>`.
#[derive(Debug, Default)]
pub struct MeterExtractor;

impl MeterExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for MeterExtractor {
    type Output = ExtractionMatch<MeterReading>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in METER_LINE.captures_iter(text) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };
            // Register values that overflow fall back to zero like any other bad number
            let previous = caps[2].parse().unwrap_or(0);
            let current = caps[3].parse().unwrap_or(0);

            results.push(
                ExtractionMatch::new(
                    MeterReading {
                        meter_id: caps[1].to_string(),
                        previous,
                        current,
                    },
                    full_match.as_str(),
                )
                .with_position(full_match.start(), full_match.end()),
            );
        }

        results
    }
}
