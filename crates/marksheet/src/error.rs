//! Errors that end a document run.
//!
//! Oracle and field-level failures never surface here; they degrade the page
//! record instead. A [`PipelineError`] means the run produced no output.

use marksheet_core::PdfError;
use thiserror::Error;

/// Fatal error for one document run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document could not be opened or read.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// A name-label synonym could not be compiled into a matcher.
    #[error("invalid name label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    /// The output table could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background worker stopped without reporting an outcome.
    #[error("task worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_errors_display_unchanged() {
        let err: PipelineError = PdfError::PasswordRequired.into();
        assert_eq!(err.to_string(), "marksheet PDF is password protected");
    }

    #[test]
    fn invalid_label_names_the_label() {
        let err = PipelineError::InvalidLabel {
            label: "Name (".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "invalid name label \"Name (\": unclosed group");
    }
}
