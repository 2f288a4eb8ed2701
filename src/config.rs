//! Configuration for an analysis run.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. The config is the only place a credential
//! enters the library: callers resolve an [`LLMProvider`] (which owns the
//! API key) and inject it here. The library itself never reads environment
//! variables.

use crate::error::SofError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default model when the caller names a provider but no model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default ceiling on aggregate statement text, in characters.
///
/// Roughly 100k tokens of statement text: about a year of busy
/// current-account statements.
pub const DEFAULT_MAX_STATEMENT_CHARS: usize = 400_000;

/// Configuration for one or many analysis runs.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use sof_assistant::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.0)
///     .max_statement_chars(Some(200_000))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider carrying the credential.
    ///
    /// Required by [`crate::analyze::analyze`]; the offline entry points
    /// (`render_response`, `extract_statements`) do not need it.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the completion. Default: 0.1.
    ///
    /// Classification and arithmetic want a near-deterministic model.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// A report for a few hundred transactions fits comfortably; set higher
    /// for very long statements or the JSON gets cut mid-array.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Per-call timeout in seconds. Default: None (the provider's own policy).
    pub api_timeout_secs: Option<u64>,

    /// Reject runs whose aggregate statement text is longer than this many
    /// characters. Default: [`DEFAULT_MAX_STATEMENT_CHARS`]. None disables.
    pub max_statement_chars: Option<usize>,

    /// Absolute tolerance for the reconciliation cross-check. Default: 0.01.
    pub reconciliation_tolerance: f64,

    /// Path to the pdfium shared library, or a directory containing it.
    /// If None, the working directory and then the system library are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Stage events receiver.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 4096,
            system_prompt: None,
            api_timeout_secs: None,
            max_statement_chars: Some(DEFAULT_MAX_STATEMENT_CHARS),
            reconciliation_tolerance: 0.01,
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt.as_ref().map(|s| s.len()))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_statement_chars", &self.max_statement_chars)
            .field("reconciliation_tolerance", &self.reconciliation_tolerance)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_statement_chars(mut self, limit: Option<usize>) -> Self {
        self.config.max_statement_chars = limit;
        self
    }

    pub fn reconciliation_tolerance(mut self, tolerance: f64) -> Self {
        self.config.reconciliation_tolerance = tolerance.abs();
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, SofError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(SofError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.max_statement_chars == Some(0) {
            return Err(SofError::InvalidConfig(
                "max_statement_chars must be ≥ 1 (use None to disable the limit)".into(),
            ));
        }
        if !c.reconciliation_tolerance.is_finite() {
            return Err(SofError::InvalidConfig(
                "reconciliation_tolerance must be a finite number".into(),
            ));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(SofError::InvalidConfig("api_timeout_secs must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
