//! Consumer unit, reference month and delivery address.

use crate::models::record::Month;

use super::patterns::{ADDRESS_END, ADDRESS_LABEL, IDENTIFICATION};
use super::{ExtractionMatch, FieldExtractor};

/// Consumer unit and reference period of an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub consumer_unit_id: String,
    pub month: Month,
    pub year: i32,
}

/// Extracts `<UC> <MMM>/<YYYY>`.
#[derive(Debug, Default)]
pub struct IdentificationExtractor;

impl IdentificationExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for IdentificationExtractor {
    type Output = ExtractionMatch<Identification>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        IDENTIFICATION
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let month = Month::from_code(&caps[2])?;
                let year = caps[3].parse().ok()?;

                Some(
                    ExtractionMatch::new(
                        Identification {
                            consumer_unit_id: caps[1].to_string(),
                            month,
                            year,
                        },
                        full_match.as_str(),
                    )
                    .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Extracts the text between `ENDEREÇO DE ENTREGA:` and the next `CEP:`.
#[derive(Debug, Default)]
pub struct AddressExtractor;

impl AddressExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let label = text.find(ADDRESS_LABEL)?;
        let start = label + ADDRESS_LABEL.len();
        let rest = &text[start..];
        let end = rest.find(ADDRESS_END).map_or(text.len(), |i| start + i);

        let address = text[start..end].trim();
        Some(ExtractionMatch::new(address.to_string(), address).with_position(start, end))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        let mut offset = 0;

        while let Some(found) = self.extract(&text[offset..]) {
            let (_, end) = found.position.unwrap_or((0, text.len() - offset));
            let found = ExtractionMatch {
                position: found.position.map(|(s, e)| (s + offset, e + offset)),
                ..found
            };
            results.push(found);
            offset += end;
            if offset >= text.len() {
                break;
            }
        }

        results
    }
}
