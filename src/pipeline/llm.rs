//! The one external model call of a run.
//!
//! All prompt wording lives in [`crate::prompts`]; this module only sends
//! `[system, user]` and hands back the reply text. There is no retry loop: a
//! failed call fails the run. Transport-level policy belongs to the
//! provider's HTTP client. An optional timeout can be set in
//! [`AnalysisConfig::api_timeout_secs`].

use crate::config::AnalysisConfig;
use crate::error::SofError;
use crate::prompts::DEFAULT_SYSTEM_PROMPT;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

/// What came back from the model.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Send the analysis prompt and wait for the reply.
pub async fn request_analysis(
    provider: &Arc<dyn LLMProvider>,
    prompt: &str,
    config: &AnalysisConfig,
) -> Result<ModelReply, SofError> {
    let start = Instant::now();
    let messages = build_messages(prompt, config);
    let options = build_options(config);

    info!("Sending analysis request ({} prompt chars)", prompt.chars().count());

    let call = provider.chat(&messages, Some(&options));
    let result = match config.api_timeout_secs {
        Some(secs) => timeout(Duration::from_secs(secs), call)
            .await
            .map_err(|_| SofError::ApiTimeout { secs })?,
        None => call.await,
    };

    let response = result.map_err(|e| SofError::LlmApiError {
        message: e.to_string(),
    })?;

    let duration = start.elapsed();
    debug!(
        "Model reply: {} input tokens, {} output tokens, {:?}",
        response.prompt_tokens, response.completion_tokens, duration
    );

    Ok(ModelReply {
        content: response.content,
        input_tokens: response.prompt_tokens as usize,
        output_tokens: response.completion_tokens as usize,
        duration_ms: duration.as_millis() as u64,
    })
}

fn build_messages(prompt: &str, config: &AnalysisConfig) -> Vec<ChatMessage> {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)]
}

/// Build `CompletionOptions` from the analysis config.
fn build_options(config: &AnalysisConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = AnalysisConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn messages_are_system_then_user() {
        let config = AnalysisConfig::default();
        let messages = build_messages("classify these", &config);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[1].content, "classify these");
    }

    #[test]
    fn system_prompt_override_is_used() {
        let config = AnalysisConfig::builder()
            .system_prompt("Be terse.")
            .build()
            .unwrap();
        let messages = build_messages("x", &config);
        assert_eq!(messages[0].content, "Be terse.");
    }
}
