//! PDF export: lay the Markdown out and write it with pdfium.
//!
//! The document is built in memory and returned as bytes; nothing touches
//! the filesystem. Like extraction, the pdfium calls run on the blocking
//! pool (see [`render_pdf_blocking`]).

use super::layout::{layout_document, DocumentLayout, FONT_SIZE_PT};
use crate::engine;
use crate::error::SofError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Render Markdown to PDF bytes with an already-bound pdfium.
pub fn render_pdf(pdfium: &Pdfium, markdown: &str) -> Result<Vec<u8>, SofError> {
    let layout = layout_document(markdown);
    write_layout(pdfium, &layout)
}

/// Write a finished layout: one pdfium page per layout page, one Helvetica
/// text object per non-empty line.
pub fn write_layout(pdfium: &Pdfium, layout: &DocumentLayout) -> Result<Vec<u8>, SofError> {
    let mut document = pdfium.create_new_pdf().map_err(render_failed)?;
    let font = document.fonts_mut().helvetica();

    for page_layout in &layout.pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(render_failed)?;

        for line in page_layout.lines.iter().filter(|l| !l.text.is_empty()) {
            let (x, y) = line.origin_pt();
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(x),
                    PdfPoints::new(y),
                    &line.text,
                    font,
                    PdfPoints::new(FONT_SIZE_PT),
                )
                .map_err(render_failed)?;
        }
    }

    let bytes = document.save_to_bytes().map_err(render_failed)?;
    debug!(
        "Wrote PDF: {} pages, {} lines, {} bytes",
        layout.page_count(),
        layout.line_count(),
        bytes.len()
    );
    Ok(bytes)
}

/// Bind pdfium and render, on the blocking pool.
pub async fn render_pdf_blocking(
    markdown: String,
    library: Option<PathBuf>,
) -> Result<Vec<u8>, SofError> {
    tokio::task::spawn_blocking(move || {
        let pdfium = engine::bind_pdfium(library.as_deref())?;
        render_pdf(&pdfium, &markdown)
    })
    .await
    .map_err(|e| SofError::Internal(format!("PDF render task panicked: {}", e)))?
}

fn render_failed(e: PdfiumError) -> SofError {
    SofError::PdfRenderFailed(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_engine_is_reported() {
        let err = render_pdf_blocking(
            "### Summary\n".to_string(),
            Some(PathBuf::from("/definitely/not/libpdfium.so")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SofError::PdfEngineUnavailable(_)), "got: {err:?}");
    }
}
