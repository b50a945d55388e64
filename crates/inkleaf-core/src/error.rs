//! Error types for inkleaf PDF parsing and extraction.

use thiserror::Error;

/// Internal error type produced by the parser, filters, and interpreter.
///
/// Public API methods on [`crate::api::Document`] fold these into the five
/// caller-facing kinds ([`PdfError::InvalidPdf`], [`PdfError::PageNotFound`],
/// [`PdfError::Extraction`], [`PdfError::Cancelled`], [`PdfError::Closed`]);
/// the rest exist so internal call sites can report precisely what went
/// wrong without widening every signature to `String`.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("invalid token at offset {offset}: {msg}")]
    Token { offset: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("no valid xref table found")]
    NoValidXref,

    #[error("PDF syntax error: {0}")]
    Syntax(String),

    #[error("filter decode error: {0}")]
    Decode(String),

    #[error("object {0} {1} not found")]
    ObjectNotFound(u32, u16),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is encrypted")]
    Encrypted,

    #[error("document not yet open")]
    NotInitialized,

    #[error("the PDF could not be opened or parsed: {0}")]
    InvalidPdf(String),

    #[error("page index out of range")]
    PageNotFound,

    #[error("content-stream interpretation failed: {0}")]
    Extraction(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation attempted on a closed document")]
    Closed,
}

/// Convenience `Result` alias for [`PdfError`].
pub type Result<T> = std::result::Result<T, PdfError>;
