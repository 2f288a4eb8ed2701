//! Text extraction: statement PDFs → one aggregate plain-text string.
//!
//! ## Why spawn_blocking?
//!
//! pdfium wraps a C++ library that is not safe to call from async contexts.
//! The whole extraction (binding included) runs on the blocking pool.
//!
//! ## Aggregation rule
//!
//! Every page contributes its text followed by exactly one `\n`, in upload
//! order and then page order. A page with no text layer (a scan, a blank
//! page) contributes an empty string, so page boundaries survive even when
//! nothing could be read. A document pdfium cannot open at all aborts the
//! whole run: leaving a statement out could misstate the reconciliation.

use crate::config::AnalysisConfig;
use crate::engine;
use crate::error::SofError;
use crate::progress::ProgressCallback;
use crate::session::StatementDocument;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How far into a file the `%PDF` header may start.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// What was read from one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub name: String,
    pub pages: usize,
    pub chars: usize,
}

/// The aggregate statement text plus a per-document account of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    pub documents: Vec<DocumentSummary>,
}

impl ExtractedText {
    pub fn page_count(&self) -> usize {
        self.documents.iter().map(|d| d.pages).sum()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extract and concatenate the text of every statement.
pub async fn extract_text(
    documents: Vec<StatementDocument>,
    config: &AnalysisConfig,
) -> Result<ExtractedText, SofError> {
    if documents.is_empty() {
        return Err(SofError::NoDocuments);
    }
    for doc in &documents {
        check_pdf_header(doc)?;
    }

    let library = config.pdfium_library.clone();
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || {
        let pdfium = engine::bind_pdfium(library.as_deref())?;
        extract_with(&pdfium, &documents, progress.as_ref())
    })
    .await
    .map_err(|e| SofError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking extraction with an already-bound pdfium.
pub fn extract_with(
    pdfium: &Pdfium,
    documents: &[StatementDocument],
    progress: Option<&ProgressCallback>,
) -> Result<ExtractedText, SofError> {
    let mut out = ExtractedText::default();

    for (index, doc) in documents.iter().enumerate() {
        let document = pdfium
            .load_pdf_from_byte_slice(&doc.bytes, None)
            .map_err(|e| SofError::UnreadableDocument {
                name: doc.name.clone(),
                detail: format!("{:?}", e),
            })?;

        let before = out.text.len();
        let pages = append_pages(
            &mut out.text,
            document
                .pages()
                .iter()
                .enumerate()
                .map(|(i, page)| page_text(&doc.name, i, &page)),
        );
        let chars = out.text[before..].chars().count();

        info!("Extracted {}: {} pages, {} chars", doc.name, pages, chars);
        if let Some(cb) = progress {
            cb.on_document_extracted(index, &doc.name, pages);
        }
        out.documents.push(DocumentSummary {
            name: doc.name.clone(),
            pages,
            chars,
        });
    }

    debug!(
        "Aggregate statement text: {} chars over {} pages",
        out.char_count(),
        out.page_count()
    );
    Ok(out)
}

fn page_text(doc_name: &str, index: usize, page: &PdfPage<'_>) -> Option<String> {
    match page.text() {
        Ok(text) => Some(text.all()),
        Err(e) => {
            warn!("{}: page {} has no readable text ({:?})", doc_name, index + 1, e);
            None
        }
    }
}

/// Append each page's text plus a newline; `None` counts as an empty page.
/// Returns the number of pages appended.
pub fn append_pages<I>(out: &mut String, pages: I) -> usize
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut count = 0;
    for page in pages {
        if let Some(text) = page {
            out.push_str(&text);
        }
        out.push('\n');
        count += 1;
    }
    count
}

/// Fail fast on files that are not PDFs at all, before pdfium is involved.
pub fn check_pdf_header(doc: &StatementDocument) -> Result<(), SofError> {
    let window = &doc.bytes[..doc.bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        return Ok(());
    }

    let detail = if doc.bytes.is_empty() {
        "file is empty".to_string()
    } else {
        let mut magic = [0u8; 4];
        let n = doc.bytes.len().min(4);
        magic[..n].copy_from_slice(&doc.bytes[..n]);
        format!("missing %PDF header (first bytes: {:?})", magic)
    };
    Err(SofError::UnreadableDocument {
        name: doc.name.clone(),
        detail,
    })
}
