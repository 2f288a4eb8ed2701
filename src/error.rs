//! Error types for the sof-assistant library.
//!
//! A run is a single linear pass, so there is one fatal error type,
//! [`SofError`]. Two of its variants are the *terminal run failures* a user
//! is expected to see and act on:
//!
//! * [`SofError::UnreadableDocument`]: an uploaded statement could not be
//!   opened as a paginated PDF. The run aborts; a statement is never skipped
//!   silently.
//! * [`SofError::MalformedModelResponse`]: the model replied with something
//!   that is not a Report JSON object. The untouched reply travels inside the
//!   error so it can be shown verbatim.
//!
//! Everything else is configuration, transport or engine trouble.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the sof-assistant library.
#[derive(Debug, Error)]
pub enum SofError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The run was started without a single statement.
    #[error("Please upload at least one PDF.")]
    NoDocuments,

    /// A form value or argument is outside its allowed range.
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A statement path given on the command line does not exist.
    #[error("Statement not found: '{path}'\nCheck the path exists and is readable.")]
    DocumentNotFound { path: PathBuf },

    /// A statement URL was syntactically valid but the download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// A statement download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// A statement cannot be parsed as a paginated document at all.
    #[error("Could not read '{name}' as a PDF: {detail}")]
    UnreadableDocument { name: String, detail: String },

    /// The aggregate statement text exceeds the configured prompt budget.
    #[error(
        "Statement text is {chars} characters, above the limit of {limit}.\n\
         Upload fewer statements or raise --max-statement-chars."
    )]
    StatementTooLarge { chars: usize, limit: usize },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The provider call failed (transport, authentication, rate limit, …).
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The provider call did not return within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// The model reply is not a JSON object matching the Report schema.
    #[error("Failed to parse AI response as JSON: {detail}")]
    MalformedModelResponse { raw_text: String, detail: String },

    // ── PDF engine errors ─────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
         Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib) to use an existing copy."
    )]
    PdfEngineUnavailable(String),

    /// pdfium refused to build the report document.
    #[error("Failed to render report PDF: {0}")]
    PdfRenderFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SofError {
    /// True for the failures a user caused or must see to fix the input:
    /// missing or unreadable statements, bad figures, and model replies
    /// that cannot be parsed.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SofError::NoDocuments
                | SofError::InvalidInput { .. }
                | SofError::UnreadableDocument { .. }
                | SofError::StatementTooLarge { .. }
                | SofError::MalformedModelResponse { .. }
        )
    }

    /// The verbatim model reply, when this is a parse failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            SofError::MalformedModelResponse { raw_text, .. } => Some(raw_text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_document_names_the_file() {
        let e = SofError::UnreadableDocument {
            name: "march.pdf".into(),
            detail: "not a PDF".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("march.pdf"), "got: {msg}");
        assert!(e.is_user_facing());
    }

    #[test]
    fn malformed_response_keeps_raw_text() {
        let e = SofError::MalformedModelResponse {
            raw_text: "Sorry, I cannot comply.".into(),
            detail: "expected value at line 1 column 1".into(),
        };
        assert_eq!(e.raw_response(), Some("Sorry, I cannot comply."));
        assert!(e.to_string().starts_with("Failed to parse AI response as JSON"));
    }

    #[test]
    fn no_documents_matches_form_warning() {
        assert_eq!(
            SofError::NoDocuments.to_string(),
            "Please upload at least one PDF."
        );
    }

    #[test]
    fn statement_too_large_display() {
        let e = SofError::StatementTooLarge {
            chars: 500_001,
            limit: 400_000,
        };
        assert!(e.to_string().contains("500001"));
        assert!(e.to_string().contains("400000"));
    }

    #[test]
    fn transport_errors_are_not_user_facing() {
        let e = SofError::LlmApiError {
            message: "429 Too Many Requests".into(),
        };
        assert!(!e.is_user_facing());
        assert!(e.raw_response().is_none());
    }
}
