//! Yes/no classification of extracted reports with an LLM.
//!
//! Each [`ReportText`] is sent to the model with a fixed system prompt and a
//! single question (see [`crate::prompts`]); the reply is attached to the
//! record as [`ClassifiedReport::yes_no`]. Reports are classified one at a
//! time. Empty reports are never sent.
//!
//! ## Retry Strategy
//!
//! Rate limits (429) and overloads (503) are transient, so a failed call is
//! retried with exponential backoff (`retry_backoff_ms * 2^(retry - 1)`).
//! With the defaults (1000 ms base, 3 retries) the waits are 1 s, 2 s, 4 s.

use crate::config::{ClassifyConfig, DEFAULT_MODEL};
use crate::corpus::ReportText;
use crate::error::{BatchError, ReportError};
use crate::prompts::{report_prompt, CLASSIFIER_SYSTEM_PROMPT, DEFAULT_QUESTION};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// A report together with the model's answer.
///
/// Serialises flat: every [`ReportText`] field plus `yes_no` and the token
/// counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedReport {
    #[serde(flatten)]
    pub report: ReportText,
    /// The model's reply, trimmed. Normally `YES` or `NO`.
    pub yes_no: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Retries needed before the call succeeded.
    pub retries: u32,
}

impl ClassifiedReport {
    /// `Some(true)` for YES, `Some(false)` for NO, `None` when the model
    /// answered something else.
    pub fn answer(&self) -> Option<bool> {
        let word = self
            .yes_no
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_ascii_uppercase();
        match word.as_str() {
            "YES" => Some(true),
            "NO" => Some(false),
            _ => None,
        }
    }
}

/// What came back from one model call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// Something that can answer a chat request.
///
/// Implemented for `Arc<dyn LLMProvider>`; tests substitute a scripted
/// backend.
pub trait ChatBackend {
    fn ask<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        options: &'a CompletionOptions,
    ) -> impl Future<Output = Result<ModelReply, String>> + 'a;
}

impl ChatBackend for Arc<dyn LLMProvider> {
    fn ask<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        options: &'a CompletionOptions,
    ) -> impl Future<Output = Result<ModelReply, String>> + 'a {
        async move {
            let response = self
                .chat(messages, Some(options))
                .await
                .map_err(|e| format!("{}", e))?;
            Ok(ModelReply {
                content: response.content,
                prompt_tokens: response.prompt_tokens,
                completion_tokens: response.completion_tokens,
            })
        }
    }
}

/// Classify one report.
///
/// # Errors
/// [`ReportError::Empty`] for a whitespace-only report (the model is not
/// called), [`ReportError::LlmFailed`] once every retry has failed.
pub async fn classify_report<B: ChatBackend>(
    backend: &B,
    report: &ReportText,
    config: &ClassifyConfig,
) -> Result<ClassifiedReport, ReportError> {
    if report.is_empty() {
        return Err(ReportError::Empty {
            path: report.path.clone(),
        });
    }

    let start = Instant::now();
    let messages = build_messages(report, config);
    let options = build_options(config);

    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "{}: retry {}/{} after {}ms",
                report.name, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match backend.ask(&messages, &options).await {
            Ok(reply) => {
                info!(
                    "{}: {} input tokens, {} output tokens, {:?}",
                    report.name,
                    reply.prompt_tokens,
                    reply.completion_tokens,
                    start.elapsed()
                );
                return Ok(ClassifiedReport {
                    report: report.clone(),
                    yes_no: reply.content.trim().to_string(),
                    input_tokens: reply.prompt_tokens,
                    output_tokens: reply.completion_tokens,
                    retries: attempt,
                });
            }
            Err(e) => {
                warn!("{}: attempt {} failed: {}", report.name, attempt + 1, e);
                last_err = Some(e);
            }
        }
    }

    Err(ReportError::LlmFailed {
        path: report.path.clone(),
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. `config.provider`, used as-is
/// 2. `config.provider_name` with `config.model` (default `gpt-4-turbo`)
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set
/// 4. OpenAI, when `OPENAI_API_KEY` is set
/// 5. `ProviderFactory::from_env` auto-detection
pub fn resolve_provider(config: &ClassifyConfig) -> Result<Arc<dyn LLMProvider>, BatchError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
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

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| BatchError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, BatchError> {
    debug!("Using provider {} with model {}", name, model);
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        BatchError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn build_messages(report: &ReportText, config: &ClassifyConfig) -> Vec<ChatMessage> {
    let system = config
        .system_prompt
        .as_deref()
        .unwrap_or(CLASSIFIER_SYSTEM_PROMPT);
    let question = config.question.as_deref().unwrap_or(DEFAULT_QUESTION);
    let prompt = report_prompt(&report.year, &report.contents, question);
    debug!("Prompt for {}:\n{}", report.path.display(), prompt);

    vec![ChatMessage::system(system), ChatMessage::user(prompt)]
}

fn build_options(config: &ClassifyConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: config.temperature,
        ..Default::default()
    }
}

/// Wait before retry number `retry` (1-based).
fn backoff_ms(base_ms: u64, retry: u32) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)))
}
