//! Common regex patterns for energy-invoice extraction.
//!
//! All patterns expect normalized text (upper case, single spaces). The
//! numeric-field patterns of each tariff group live in the field tables
//! (`invoice::layout`); this module holds the patterns shared by both groups.

use lazy_static::lazy_static;
use regex::Regex;

/// Label opening the delivery address.
pub const ADDRESS_LABEL: &str = "ENDEREÇO DE ENTREGA:";

/// Label closing the delivery address.
pub const ADDRESS_END: &str = "CEP:";

/// Anchor of the compensation-energy (SCEE) section.
pub const SCEE_ANCHOR: &str = "INFORMAÇÕES DO SCEE";

lazy_static! {
    // Consumer unit followed by the reference month: "140753532 DEZ/2025"
    pub static ref IDENTIFICATION: Regex = Regex::new(
        r"(\d{7,})\s+(JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)/(\d{4})"
    ).unwrap();

    // Previous and current reading dates, day count, next reading date
    pub static ref READING_DATES: Regex = Regex::new(
        r"(\d{2}/\d{2}/\d{4})\s+(\d{2}/\d{2}/\d{4})\s+\d+\s+\d{2}/\d{2}/\d{4}"
    ).unwrap();

    // Meter id with check digit, then previous/current register values
    pub static ref METER_LINE: Regex = Regex::new(
        r"(\d{7,}-\d)\s+ENERGIA ATIVA\s*-\s*KWH ÚNICO\s+(\d+)\s+(\d+)"
    ).unwrap();

    // Brazilian decimal token: 1.234,56
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"\d[\d.]*,\d{2}"
    ).unwrap();

    // History table row: month, two-digit year, up to nine numeric columns
    pub static ref HISTORY_ROW: Regex = Regex::new(
        r"\b(JAN|FEV|MAR|ABR|MAI|JUN|JUL|AGO|SET|OUT|NOV|DEZ)\s*[/\-]\s*(\d{2})((?:\s+[\d.,]+){1,9})"
    ).unwrap();
}
