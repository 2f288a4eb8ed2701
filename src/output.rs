//! Results of an analysis run.

use crate::report::{ReconciliationMismatch, Report};
use serde::{Deserialize, Serialize};

/// File name offered for the PDF download.
pub const PDF_FILE_NAME: &str = "analysis.pdf";

/// MIME type of the PDF download.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Everything one run produced.
///
/// `pdf` is left out of the JSON form; it is written to a file or served
/// as a download instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub report: Report,
    pub markdown: String,
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// Set when the model's shortfall disagrees with its own figures.
    pub reconciliation_check: Option<ReconciliationMismatch>,
    pub stats: AnalysisStats,
}

impl Analysis {
    pub fn has_reconciliation_mismatch(&self) -> bool {
        self.reconciliation_check.is_some()
    }
}

/// Timing and size figures for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub documents: usize,
    pub pages: usize,
    pub statement_chars: usize,
    pub prompt_chars: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub extract_ms: u64,
    pub llm_ms: u64,
    pub render_ms: u64,
    pub total_ms: u64,
}

/// A saved model response rendered offline: no extraction, no model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedReport {
    pub report: Report,
    pub markdown: String,
    #[serde(skip)]
    pub pdf: Vec<u8>,
    pub reconciliation_check: Option<ReconciliationMismatch>,
}
