//! Progress-callback trait for analysis stage events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to hear about
//! each stage of a run: statements read, model called, report rendered.
//!
//! # Example
//!
//! ```rust
//! use sof_assistant::{AnalysisConfig, AnalysisProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl AnalysisProgressCallback for Log {
//!     fn on_document_extracted(&self, index: usize, name: &str, pages: usize) {
//!         eprintln!("statement {} ({name}): {pages} pages", index + 1);
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the analysis pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The trait is `Send + Sync` because the form server
/// shares one config across request tasks.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before the first statement is opened.
    fn on_analysis_start(&self, documents: usize) {
        let _ = documents;
    }

    /// Called after each statement's text has been read.
    ///
    /// # Arguments
    /// * `index`: 0-indexed position in upload order
    /// * `name` : statement file name
    /// * `pages`: pages read from it
    fn on_document_extracted(&self, index: usize, name: &str, pages: usize) {
        let _ = (index, name, pages);
    }

    /// Called just before the model request is sent.
    fn on_model_request(&self, prompt_chars: usize) {
        let _ = prompt_chars;
    }

    /// Called when the model has replied (before parsing).
    fn on_model_response(&self, response_chars: usize, elapsed_ms: u64) {
        let _ = (response_chars, elapsed_ms);
    }

    /// Called once after the report has been rendered to Markdown and PDF.
    fn on_analysis_complete(&self, transactions: usize, red_flags: usize) {
        let _ = (transactions, red_flags);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
