//! Error types for the fatura-core library.
//!
//! Field extraction has no error type: a pattern that does not match leaves
//! its field at the default value. Errors only come from the collaborators
//! around the extractor (PDF loading, workbook access, configuration).

use thiserror::Error;

/// Main error type for the fatura library.
#[derive(Error, Debug)]
pub enum FaturaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Workbook access error.
    #[error("sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to workbook access.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SheetError {
    /// The workbook has no sheets at all.
    #[error("workbook has no sheets")]
    EmptyWorkbook,

    /// A sheet was requested by name and not found.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// A cell reference could not be parsed.
    #[error("invalid cell reference: {0}")]
    InvalidCell(String),
}

/// Result type for the fatura library.
pub type Result<T> = std::result::Result<T, FaturaError>;
