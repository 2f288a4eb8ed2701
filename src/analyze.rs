//! Analysis entry points.
//!
//! One run is a single linear pass; the first failure ends it and no partial
//! report is produced:
//!
//! ```text
//! statements ─▶ extract ─▶ size check ─▶ prompt ─▶ model ─▶ parse ─▶ markdown ─▶ pdf
//! ```
//!
//! [`render_response`] re-enters the pass at `parse`, for model replies saved
//! earlier; [`extract_statements`] stops after `extract`.

use crate::config::{AnalysisConfig, DEFAULT_MODEL};
use crate::error::SofError;
use crate::output::{Analysis, AnalysisStats, RenderedReport};
use crate::pipeline::extract::{self, ExtractedText};
use crate::pipeline::{llm, response};
use crate::prompts::build_prompt;
use crate::render::{markdown::render_markdown, pdf::render_pdf_blocking};
use crate::session::{AnalysisRequest, StatementDocument};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run one full analysis.
///
/// # Errors
/// The two failures a user is expected to act on are
/// [`SofError::UnreadableDocument`] (a statement could not be read) and
/// [`SofError::MalformedModelResponse`] (the reply was not a usable report;
/// the raw text rides along). Everything else is setup or transport.
pub async fn analyze(
    request: AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<Analysis, SofError> {
    let total_start = Instant::now();
    let AnalysisRequest {
        documents,
        figures,
        role,
    } = request;

    if documents.is_empty() {
        return Err(SofError::NoDocuments);
    }
    let document_count = documents.len();
    info!("Starting analysis: {} statements, role {}", document_count, role);

    // ── Step 1: Provider ─────────────────────────────────────────────────
    let provider = resolve_provider(config)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_start(document_count);
    }

    // ── Step 2: Extract statement text ───────────────────────────────────
    let extract_start = Instant::now();
    let extracted = extract::extract_text(documents, config).await?;
    let extract_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} pages ({} chars) in {}ms",
        extracted.page_count(),
        extracted.char_count(),
        extract_ms
    );

    // ── Step 3: Prompt ───────────────────────────────────────────────────
    check_statement_size(&extracted.text, config.max_statement_chars)?;
    let prompt = build_prompt(&extracted.text, &figures);
    let prompt_chars = prompt.chars().count();

    // ── Step 4: Model call ───────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_model_request(prompt_chars);
    }
    let reply = llm::request_analysis(&provider, &prompt, config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_model_response(reply.content.chars().count(), reply.duration_ms);
    }

    // ── Step 5: Parse and render ─────────────────────────────────────────
    let render_start = Instant::now();
    let rendered = render_response(&reply.content, config).await?;
    let render_ms = render_start.elapsed().as_millis() as u64;

    let stats = AnalysisStats {
        documents: document_count,
        pages: extracted.page_count(),
        statement_chars: extracted.char_count(),
        prompt_chars,
        input_tokens: reply.input_tokens as u64,
        output_tokens: reply.output_tokens as u64,
        extract_ms,
        llm_ms: reply.duration_ms,
        render_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Analysis complete: {} transactions, {} red flags, {}ms total",
        rendered.report.transactions.len(),
        rendered.report.red_flags.len(),
        stats.total_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(
            rendered.report.transactions.len(),
            rendered.report.red_flags.len(),
        );
    }

    Ok(Analysis {
        report: rendered.report,
        markdown: rendered.markdown,
        pdf: rendered.pdf,
        reconciliation_check: rendered.reconciliation_check,
        stats,
    })
}

/// Parse a model reply and render it, without extraction or a model call.
///
/// A reply that does not parse returns before pdfium is touched.
pub async fn render_response(
    raw: &str,
    config: &AnalysisConfig,
) -> Result<RenderedReport, SofError> {
    let report = response::parse_report(raw)?;

    let reconciliation_check = report
        .reconciliation
        .cross_check(config.reconciliation_tolerance);
    if let Some(ref mismatch) = reconciliation_check {
        warn!("{}", mismatch);
    }

    let markdown = render_markdown(&report);
    debug!("Rendered markdown: {} bytes", markdown.len());

    let pdf = render_pdf_blocking(markdown.clone(), config.pdfium_library.clone()).await?;

    Ok(RenderedReport {
        report,
        markdown,
        pdf,
        reconciliation_check,
    })
}

/// Read the statements only. Needs no provider.
pub async fn extract_statements(
    documents: Vec<StatementDocument>,
    config: &AnalysisConfig,
) -> Result<ExtractedText, SofError> {
    extract::extract_text(documents, config).await
}

/// Run an analysis and write the PDF to `output_path`.
pub async fn analyze_to_file(
    request: AnalysisRequest,
    output_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<Analysis, SofError> {
    let analysis = analyze(request, config).await?;
    write_pdf(output_path.as_ref(), &analysis.pdf).await?;
    Ok(analysis)
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    request: AnalysisRequest,
    config: &AnalysisConfig,
) -> Result<Analysis, SofError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SofError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(request, config))
}

/// Write bytes atomically: temp file next to the target, then rename.
pub async fn write_pdf(path: &Path, bytes: &[u8]) -> Result<(), SofError> {
    let write_failed = |e| SofError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_failed)?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Refuse statement text over the configured limit rather than cut it.
pub fn check_statement_size(text: &str, limit: Option<usize>) -> Result<(), SofError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let chars = text.chars().count();
    if chars > limit {
        return Err(SofError::StatementTooLarge { chars, limit });
    }
    Ok(())
}

/// The provider for a run: the injected one, else one built by name.
///
/// Named providers are created through [`ProviderFactory`], which looks up
/// that provider's own credential. Anything broader (scanning the
/// environment for whichever key is set) is left to the caller.
pub fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, SofError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            SofError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        });
    }

    Err(SofError::ProviderNotConfigured {
        provider: "none".to_string(),
        hint: "Inject one with AnalysisConfigBuilder::provider or name one with provider_name"
            .to_string(),
    })
}
