//! Error and option types for document access.
//!
//! [`PdfError`] covers the failures that stop a document run;
//! [`ExtractOptions`] bounds input size and Form XObject nesting.

use std::fmt;

/// Why a marksheet document could not be opened or a page could not be read.
///
/// Any of these ends the run for that document. Field-level problems never
/// surface here; they resolve to an absent value instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfError {
    /// The bytes are not a readable PDF (bad header, xref or page tree).
    ParseError(String),
    /// The marksheet file could not be read from disk.
    IoError(String),
    /// A page font is too damaged to decode its text.
    FontError(String),
    /// A page's content stream could not be walked.
    InterpreterError(String),
    /// The input is larger than [`ExtractOptions::max_input_bytes`] allows.
    ResourceLimitExceeded {
        /// Which option was exceeded, e.g. `"max_input_bytes"`.
        limit_name: String,
        limit_value: usize,
        actual_value: usize,
    },
    /// The marksheet is encrypted; no password is ever supplied.
    PasswordRequired,
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::ParseError(msg) => write!(f, "not a readable PDF: {msg}"),
            PdfError::IoError(msg) => write!(f, "cannot read marksheet file: {msg}"),
            PdfError::FontError(msg) => write!(f, "unusable page font: {msg}"),
            PdfError::InterpreterError(msg) => write!(f, "unreadable page content: {msg}"),
            PdfError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "marksheet exceeds {limit_name}: {actual_value} > {limit_value}"
            ),
            PdfError::PasswordRequired => write!(f, "marksheet PDF is password protected"),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<std::io::Error> for PdfError {
    fn from(err: std::io::Error) -> Self {
        PdfError::IoError(err.to_string())
    }
}

/// Options controlling interpretation behavior and resource limits.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum recursion depth for nested Form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum input PDF file size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
            max_input_bytes: None,
        }
    }
}
