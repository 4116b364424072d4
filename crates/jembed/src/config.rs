use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "jina-embeddings-v3";
pub const DEFAULT_TASK: &str = "text-matching";

/// Tunables for the batching/retry pipeline.
///
/// Everything that used to be a module-level constant in earlier
/// iterations lives here so callers (and tests) can override per
/// orchestrator: tests inject `retry_backoff_ms: 0` for deterministic,
/// fast retry scenarios.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Endpoint accepting the embedding request JSON via POST.
    pub api_url: String,
    pub batch_size: usize,
    /// Attempts per batch before unresolved items degrade to zero vectors.
    pub max_retries: u32,
    pub timeout_secs: u64,
    /// Fixed pause between failed attempts; deliberately not exponential.
    pub retry_backoff_ms: u64,
    /// Placeholder vector length when the caller did not request
    /// explicit dimensions.
    pub default_dimensions: usize,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/embd".to_string(),
            batch_size: 32,
            max_retries: 3,
            timeout_secs: 60,
            retry_backoff_ms: 1_000,
            default_dimensions: 1024,
        }
    }
}

impl EmbedConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Per-call options forwarded to the embedding request.
///
/// `task` and the `truncate` hint are merged into the request only when
/// `model` is the default model, matching the endpoint's expectations;
/// the optional fields are sent only when set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    pub model: String,
    pub task: Option<String>,
    /// Requested vector length; also sizes placeholder vectors on failure.
    pub dimensions: Option<usize>,
    pub embedding_type: Option<String>,
    pub late_chunking: Option<bool>,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            task: None,
            dimensions: None,
            embedding_type: None,
            late_chunking: None,
        }
    }
}

impl EmbedOptions {
    pub fn is_default_model(&self) -> bool {
        self.model == DEFAULT_MODEL
    }
}
