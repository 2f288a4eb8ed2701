//! CLI binary for sof-assistant.
//!
//! A thin shim over the library crate: maps flags to `AnalysisConfig`,
//! resolves the LLM provider from the environment, and either serves the
//! upload form or runs one analysis headless.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_llm::{LLMProvider, ProviderFactory};
use indicatif::{ProgressBar, ProgressStyle};
use sof_assistant::config::DEFAULT_MODEL;
use sof_assistant::pipeline::input::{output_path, resolve_documents};
use sof_assistant::web::{run_server, AppState};
use sof_assistant::{
    analyze::write_pdf, analyze_to_file, extract_statements, render_response, AnalysisConfig,
    AnalysisProgressCallback, AnalysisRequest, ProgressCallback, PurchaseFigures,
    ReconciliationMismatch, UserRole, PDF_FILE_NAME,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr with one log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Clear the spinner after a failed run.
    fn abandon(&self) {
        self.bar.finish_and_clear();
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_analysis_start(&self, documents: usize) {
        self.bar.set_prefix("Reading");
        self.bar.set_message(format!("{documents} statement(s)…"));
    }

    fn on_document_extracted(&self, index: usize, name: &str, pages: usize) {
        self.bar.println(format!(
            "  {} {:>2}. {:<32} {}",
            green("✓"),
            index + 1,
            name,
            dim(&format!("{pages} pages")),
        ));
    }

    fn on_model_request(&self, prompt_chars: usize) {
        self.bar.set_prefix("Analyzing");
        self.bar.set_message(format!("{prompt_chars} prompt chars sent, waiting for the model…"));
    }

    fn on_model_response(&self, response_chars: usize, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} Model replied  {}  {}",
            green("✓"),
            dim(&format!("{response_chars} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.set_prefix("Rendering");
        self.bar.set_message("report and PDF…");
    }

    fn on_analysis_complete(&self, transactions: usize, red_flags: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} transactions classified, {} red flags",
            green("✔"),
            bold(&transactions.to_string()),
            if red_flags == 0 {
                bold("0")
            } else {
                red(&red_flags.to_string())
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the upload form on http://127.0.0.1:8501
  sof-assistant serve

  # Analyze two statements headless, PDF to analysis.pdf, markdown to stdout
  sof-assistant analyze jan.pdf feb.pdf \
      --purchase-price 350000 --mortgage-advance 280000 --personal-contribution 70000

  # Structured output instead of markdown
  sof-assistant analyze statements/*.pdf --purchase-price 350000 --json > analysis.json

  # Re-render a saved model reply (no API key needed)
  sof-assistant render reply.json -o analysis.pdf

  # Show what the model would be given (no API key needed)
  sof-assistant extract jan.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (preferred when present)
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Provider to use together with EDGEQUAKE_MODEL
  EDGEQUAKE_MODEL         Model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. sof_assistant=debug
"#;

/// Source-of-funds checks on bank statements for property purchases.
#[derive(Parser, Debug)]
#[command(
    name = "sof-assistant",
    version,
    about = "AML source-of-funds assistant for conveyancing",
    long_about = "Reads bank-statement PDFs, asks a language model to classify the \
transactions against the declared purchase figures, and renders the result as a \
Markdown report with a PDF export.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the pdfium shared library, or a directory holding it.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "SOF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "SOF_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the single-page upload form.
    Serve(ServeArgs),
    /// Analyze statements and write the PDF report.
    Analyze(AnalyzeArgs),
    /// Render a saved model reply to Markdown and PDF.
    Render(RenderArgs),
    /// Print the text extracted from statements.
    Extract(ExtractArgs),
}

/// Flags that shape the model call.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "SOF_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "SOF_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM call timeout in seconds (unset: the provider's own).
    #[arg(long, env = "SOF_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Refuse statement text longer than this many characters (0: no limit).
    #[arg(long, env = "SOF_MAX_STATEMENT_CHARS", default_value_t = sof_assistant::config::DEFAULT_MAX_STATEMENT_CHARS)]
    max_statement_chars: usize,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "SOF_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "SOF_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "SOF_PORT", default_value_t = 8501)]
    port: u16,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "SOF_MAX_UPLOAD_MB", default_value_t = 32)]
    max_upload_mb: usize,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Statement PDFs: local paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    statements: Vec<String>,

    /// Purchase price (£).
    #[arg(long, default_value_t = 0.0)]
    purchase_price: f64,

    /// Mortgage advance (£).
    #[arg(long, default_value_t = 0.0)]
    mortgage_advance: f64,

    /// Personal contribution (£).
    #[arg(long, default_value_t = 0.0)]
    personal_contribution: f64,

    /// Your role: Client, Solicitor, Estate Agent.
    #[arg(long, default_value = "Client")]
    role: String,

    /// Write the PDF report here (a directory gets analysis.pdf).
    #[arg(short, long, env = "SOF_OUTPUT", default_value = PDF_FILE_NAME)]
    output: PathBuf,

    /// Also write the Markdown report to this file.
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Print the structured analysis as JSON instead of Markdown.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "SOF_NO_PROGRESS")]
    no_progress: bool,

    /// HTTP download timeout for statement URLs, in seconds.
    #[arg(long, env = "SOF_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// File holding the model's reply.
    response: PathBuf,

    /// Write the PDF report here (a directory gets analysis.pdf).
    #[arg(short, long, default_value = PDF_FILE_NAME)]
    output: PathBuf,

    /// Print the structured report as JSON instead of Markdown.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Statement PDFs: local paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    statements: Vec<String>,

    /// HTTP download timeout for statement URLs, in seconds.
    #[arg(long, env = "SOF_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters in a headless run, so
    // INFO logs are held back while it is showing.
    let show_progress = match &cli.command {
        Command::Analyze(args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Serve(args) => serve(&cli, args).await,
        Command::Analyze(args) => analyze(&cli, args, show_progress).await,
        Command::Render(args) => render(&cli, args).await,
        Command::Extract(args) => extract(&cli, args).await,
    }
}

async fn serve(cli: &Cli, args: &ServeArgs) -> Result<()> {
    let mut config = build_config(&args.model, cli.pdfium_lib.as_deref(), None).await?;
    config.provider = Some(resolve_cli_provider(&args.model)?);

    let state = AppState::new(config).with_max_upload_bytes(args.max_upload_mb * 1024 * 1024);

    if !cli.quiet {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Serving on http://{}:{}", args.host, args.port))
        );
    }
    run_server(state, &args.host, args.port)
        .await
        .context("Server failed")
}

async fn analyze(cli: &Cli, args: &AnalyzeArgs, show_progress: bool) -> Result<()> {
    let figures = PurchaseFigures::new(
        args.purchase_price,
        args.mortgage_advance,
        args.personal_contribution,
    )?;
    let role: UserRole = args.role.parse()?;

    let spinner = show_progress.then(CliProgressCallback::new);
    let progress = spinner
        .clone()
        .map(|cb| cb as Arc<dyn AnalysisProgressCallback>);

    let mut config = build_config(&args.model, cli.pdfium_lib.as_deref(), progress).await?;
    config.provider = Some(resolve_cli_provider(&args.model)?);

    let documents = resolve_documents(&args.statements, args.download_timeout)
        .await
        .context("Failed to read statements")?;
    let request = AnalysisRequest::new(documents, figures).with_role(role);
    let pdf_path = output_path(&args.output, PDF_FILE_NAME);

    let analysis = match analyze_to_file(request, &pdf_path, &config).await {
        Ok(analysis) => analysis,
        Err(e) => {
            if let Some(ref cb) = spinner {
                cb.abandon();
            }
            if let Some(raw) = e.raw_response() {
                eprintln!("{}", red("Failed to parse AI response as JSON."));
                eprintln!("{raw}");
            }
            return Err(e).context("Analysis failed");
        }
    };

    if let Some(ref path) = args.markdown {
        tokio::fs::write(path, &analysis.markdown)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&analysis).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_markdown(&analysis.markdown)?;
    }

    if let Some(ref mismatch) = analysis.reconciliation_check {
        warn_mismatch(mismatch);
    }

    if !cli.quiet {
        let s = &analysis.stats;
        eprintln!(
            "{}  {} statements, {} pages  {}ms  →  {}",
            green("✔"),
            s.documents,
            s.pages,
            s.total_ms,
            bold(&pdf_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&s.input_tokens.to_string()),
            dim(&s.output_tokens.to_string()),
        );
    }
    Ok(())
}

async fn render(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.response)
        .await
        .with_context(|| format!("Failed to read {}", args.response.display()))?;

    let config = build_base(cli.pdfium_lib.as_deref())?;
    let rendered = match render_response(&raw, &config).await {
        Ok(rendered) => rendered,
        Err(e) => {
            if let Some(raw) = e.raw_response() {
                eprintln!("{}", red("Failed to parse AI response as JSON."));
                eprintln!("{raw}");
            }
            return Err(e).context("Render failed");
        }
    };

    let pdf_path = output_path(&args.output, PDF_FILE_NAME);
    write_pdf(&pdf_path, &rendered.pdf).await?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&rendered).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_markdown(&rendered.markdown)?;
    }

    if let Some(ref mismatch) = rendered.reconciliation_check {
        warn_mismatch(mismatch);
    }
    if !cli.quiet {
        eprintln!("{}  →  {}", green("✔"), bold(&pdf_path.display().to_string()));
    }
    Ok(())
}

async fn extract(cli: &Cli, args: &ExtractArgs) -> Result<()> {
    let config = build_base(cli.pdfium_lib.as_deref())?;

    let documents = resolve_documents(&args.statements, args.download_timeout)
        .await
        .context("Failed to read statements")?;
    let extracted = extract_statements(documents, &config)
        .await
        .context("Extraction failed")?;

    io::stdout()
        .lock()
        .write_all(extracted.text.as_bytes())
        .context("Failed to write to stdout")?;

    if !cli.quiet {
        for doc in &extracted.documents {
            eprintln!(
                "  {} {:<32} {}",
                green("✓"),
                doc.name,
                dim(&format!("{} pages, {} chars", doc.pages, doc.chars)),
            );
        }
    }
    Ok(())
}

fn print_markdown(markdown: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(markdown.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

fn warn_mismatch(mismatch: &ReconciliationMismatch) {
    eprintln!("{} {}", yellow("⚠"), yellow(&mismatch.to_string()));
}

/// Config for the offline commands: no provider, no model flags.
fn build_base(pdfium_lib: Option<&Path>) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder();
    if let Some(path) = pdfium_lib {
        builder = builder.pdfium_library(path);
    }
    builder.build().context("Invalid configuration")
}

/// Map CLI args to `AnalysisConfig`.
async fn build_config(
    args: &ModelArgs,
    pdfium_lib: Option<&Path>,
    progress: Option<ProgressCallback>,
) -> Result<AnalysisConfig> {
    let max_statement_chars = match args.max_statement_chars {
        0 => None,
        n => Some(n),
    };

    let mut builder = AnalysisConfig::builder()
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .api_timeout_secs(args.api_timeout)
        .max_statement_chars(max_statement_chars);

    if let Some(ref model) = args.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref name) = args.provider {
        builder = builder.provider_name(name.clone());
    }
    if let Some(ref path) = args.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(path) = pdfium_lib {
        builder = builder.pdfium_library(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. `--provider` (with `--model` or the default model)
/// 2. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, both set
/// 3. OpenAI when `OPENAI_API_KEY` is set, so it wins over other keys
/// 4. whatever [`ProviderFactory::from_env`] detects
fn resolve_cli_provider(args: &ModelArgs) -> Result<Arc<dyn LLMProvider>> {
    let model = args.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = args.provider {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|key| !key.is_empty()) {
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) = ProviderFactory::from_env().map_err(|e| {
        sof_assistant::SofError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                 Error: {}",
                e
            ),
        }
    })?;
    Ok(llm_provider)
}

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>> {
    let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        sof_assistant::SofError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok(provider)
}
