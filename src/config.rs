//! Configuration types for a batch OCR run and for report classification.
//!
//! All run behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The defaults reproduce the plain invocation:
//! walk `data/PFD_docs`, run `ocrmypdf --skip-text` then `pdftotext` on
//! every candidate, one file at a time, with no timeout.
//!
//! [`ClassifyConfig`] drives [`crate::classify`].

use crate::error::BatchError;
use crate::progress::BatchProgressCallback;
use crate::pipeline::tools::ToolSpec;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Root walked when none is given.
pub const DEFAULT_ROOT: &str = "data/PFD_docs";

/// Configuration for a batch OCR run.
///
/// # Example
/// ```rust
/// use pdf_ocr_batch::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .root("scans")
///     .tool_timeout_secs(600)
///     .build()
///     .unwrap();
/// assert_eq!(config.root.to_str(), Some("scans"));
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory walked recursively. Default: `data/PFD_docs`.
    pub root: PathBuf,

    /// OCR engine. Default: `ocrmypdf`.
    pub ocr_tool: ToolSpec,

    /// Text extractor. Default: `pdftotext`.
    pub text_tool: ToolSpec,

    /// Pass `--skip-text` so pages that already carry a text layer are
    /// copied through instead of re-OCR'd. Default: true.
    pub skip_text: bool,

    /// Kill a tool that runs longer than this. Default: None (wait forever).
    pub tool_timeout_secs: Option<u64>,

    /// Walk and classify only; never spawn a tool. Default: false.
    pub dry_run: bool,

    /// Per-file progress events. Default: None.
    pub progress_callback: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            ocr_tool: ToolSpec::new("ocrmypdf"),
            text_tool: ToolSpec::new("pdftotext"),
            skip_text: true,
            tool_timeout_secs: None,
            dry_run: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("root", &self.root)
            .field("ocr_tool", &self.ocr_tool)
            .field("text_tool", &self.text_tool)
            .field("skip_text", &self.skip_text)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("dry_run", &self.dry_run)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn ocr_tool(mut self, tool: ToolSpec) -> Self {
        self.config.ocr_tool = tool;
        self
    }

    pub fn text_tool(mut self, tool: ToolSpec) -> Self {
        self.config.text_tool = tool;
        self
    }

    pub fn skip_text(mut self, v: bool) -> Self {
        self.config.skip_text = v;
        self
    }

    pub fn tool_timeout_secs(mut self, secs: u64) -> Self {
        self.config.tool_timeout_secs = Some(secs);
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, BatchError> {
        let c = &self.config;
        if c.root.as_os_str().is_empty() {
            return Err(BatchError::InvalidConfig("root path is empty".into()));
        }
        if c.ocr_tool.program.is_empty() {
            return Err(BatchError::InvalidConfig("OCR program is empty".into()));
        }
        if c.text_tool.program.is_empty() {
            return Err(BatchError::InvalidConfig(
                "text extractor program is empty".into(),
            ));
        }
        if c.tool_timeout_secs == Some(0) {
            return Err(BatchError::InvalidConfig(
                "tool timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Model asked when neither a model nor a provider/model pair is configured.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Configuration for classifying extracted reports with an LLM.
#[derive(Clone)]
pub struct ClassifyConfig {
    /// LLM model ID. Default: None (`gpt-4-turbo` when OpenAI is picked).
    pub model: Option<String>,

    /// Provider name: openai, anthropic, gemini, ollama, azure.
    /// Default: None (auto-detect from API key env vars).
    pub provider_name: Option<String>,

    /// Pre-built provider instance. Takes priority over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Override for [`crate::prompts::CLASSIFIER_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Override for [`crate::prompts::DEFAULT_QUESTION`].
    pub question: Option<String>,

    /// Sampling temperature. Default: None (provider default).
    pub temperature: Option<f32>,

    /// Retries per report after the first attempt. Default: 3.
    pub max_retries: u32,

    /// Base back-off; doubles after each retry. Default: 1000 ms,
    /// i.e. waits of 1 s, 2 s and 4 s.
    pub retry_backoff_ms: u64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            system_prompt: None,
            question: None,
            temperature: None,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

impl fmt::Debug for ClassifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifyConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("system_prompt", &self.system_prompt.as_ref().map(|s| s.len()))
            .field("question", &self.question)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

impl ClassifyConfig {
    /// Create a new builder for `ClassifyConfig`.
    pub fn builder() -> ClassifyConfigBuilder {
        ClassifyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClassifyConfig`].
#[derive(Debug)]
pub struct ClassifyConfigBuilder {
    config: ClassifyConfig,
}

impl ClassifyConfigBuilder {
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

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.config.question = Some(question.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClassifyConfig, BatchError> {
        let c = &self.config;
        if c.question.as_deref().is_some_and(|q| q.trim().is_empty()) {
            return Err(BatchError::InvalidConfig("question is empty".into()));
        }
        if c.system_prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(BatchError::InvalidConfig("system prompt is empty".into()));
        }
        if c.max_retries > 10 {
            return Err(BatchError::InvalidConfig(
                "max_retries must be ≤ 10".into(),
            ));
        }
        Ok(self.config)
    }
}
