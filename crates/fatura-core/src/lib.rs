//! Core library for Brazilian energy-invoice extraction.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract, behind the `pdf` feature)
//! - Text and Brazilian-locale number normalization
//! - Versioned field tables for Group A (time-of-use) and Group B
//!   (single-class) invoices, with per-field match diagnostics
//! - Consumption history recovery for Group A invoices
//! - Placement of extracted records into a balance workbook

pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod sheet;

pub use error::{FaturaError, PdfError, Result, SheetError};
pub use invoice::{ExtractionResult, InvoiceParser, MatchReport, TariffInvoiceParser};
pub use models::config::{FaturaConfig, GroupSelection, ReservedColumn};
pub use models::record::{
    FieldValue, HistoricalEntry, InvoiceRecord, Month, RecordField, TariffGroup,
};
#[cfg(feature = "pdf")]
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use sheet::{write_batch, MemoryWorkbook, SheetLayout, WriteReport};
