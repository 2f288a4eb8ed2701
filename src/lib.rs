//! # sof-assistant
//!
//! Source-of-funds checks for property conveyancing: read a buyer's bank
//! statements, have a language model classify the transactions against the
//! declared purchase figures, and render the result as a report with a PDF
//! export.
//!
//! ## Pipeline Overview
//!
//! ```text
//! statement PDFs + purchase figures
//!  │
//!  ├─ 1. Extract   page text via pdfium, concatenated (spawn_blocking)
//!  ├─ 2. Prompt    task + figures + JSON schema + statement text
//!  ├─ 3. Model     one chat call through edgequake-llm
//!  ├─ 4. Parse     reply → Report (strict JSON, raw text kept on failure)
//!  ├─ 5. Markdown  fixed four-section report
//!  └─ 6. PDF       A4, Helvetica 12pt, wrapped and paginated
//! ```
//!
//! The domain reasoning (classification, red flags, reconciliation) is the
//! model's. This crate owns getting text in and the report out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sof_assistant::{
//!     analyze, AnalysisConfig, AnalysisRequest, PurchaseFigures, StatementDocument,
//! };
//! use edgequake_llm::ProviderFactory;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = ProviderFactory::create_llm_provider("openai", "gpt-4.1-nano")?;
//!     let config = AnalysisConfig::builder().provider(provider).build()?;
//!
//!     let statement = StatementDocument::new("march.pdf", std::fs::read("march.pdf")?);
//!     let figures = PurchaseFigures::new(350_000.0, 280_000.0, 70_000.0)?;
//!     let analysis = analyze(AnalysisRequest::new(vec![statement], figures), &config).await?;
//!
//!     println!("{}", analysis.markdown);
//!     std::fs::write("analysis.pdf", &analysis.pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | The `sof-assistant` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | The single-page upload form (axum + tower-http + pulldown-cmark) |
//!
//! Library-only users can drop both:
//! ```toml
//! sof-assistant = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod report;
pub mod session;

#[cfg(feature = "server")]
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_sync, analyze_to_file, extract_statements, render_response, resolve_provider,
};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::SofError;
pub use output::{Analysis, AnalysisStats, RenderedReport, PDF_FILE_NAME, PDF_MIME_TYPE};
pub use pipeline::extract::ExtractedText;
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use render::markdown::render_markdown;
pub use report::{Amount, Direction, Reconciliation, ReconciliationMismatch, Report, Transaction};
pub use session::{AnalysisRequest, PurchaseFigures, StatementDocument, UserRole};
