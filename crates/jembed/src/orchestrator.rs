use std::sync::Arc;

use crate::batch::split_batches;
use crate::config::{EmbedConfig, EmbedOptions};
use crate::error::EmbedError;
use crate::input::InputItem;
use crate::providers::jina::JinaBackend;
use crate::retry::BatchRetry;

/// Aggregate usage for one orchestration call. Embedding calls report
/// prompt and total as the same number; completion is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Optional collaborator notified once after all batches complete.
pub trait UsageTracker: Send + Sync {
    fn track_usage(&self, category: &str, usage: TokenUsage);
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResult {
    /// One vector per input item, in input order (shorter only after a
    /// fatal API condition ended the run early).
    pub embeddings: Vec<Vec<f32>>,
    pub tokens: u64,
}

/// Top-level entry point: sanitizes and splits the input, drives the
/// per-batch retry engine sequentially, and reassembles results in
/// input order.
pub struct EmbeddingsOrchestrator {
    config: EmbedConfig,
    backend: JinaBackend,
    tracker: Option<Arc<dyn UsageTracker>>,
}

impl EmbeddingsOrchestrator {
    pub fn new(config: EmbedConfig) -> Result<Self, EmbedError> {
        let backend = JinaBackend::new(&config)?;
        Ok(Self {
            config,
            backend,
            tracker: None,
        })
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn UsageTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Embed every item, preserving input order.
    ///
    /// Transient failures never surface here: after retries are
    /// exhausted the affected items degrade to zero vectors. A fatal
    /// API condition ends the run early with the batches completed so
    /// far. Only programming errors return `Err`.
    pub async fn get_embeddings(
        &self,
        items: &[InputItem],
        options: &EmbedOptions,
    ) -> Result<EmbeddingResult, EmbedError> {
        tracing::debug!(
            target: "embed-pipeline",
            count = items.len(),
            "getting embeddings"
        );
        if items.is_empty() || items.iter().all(InputItem::is_blank) {
            return Ok(EmbeddingResult {
                embeddings: Vec::new(),
                tokens: 0,
            });
        }

        let mut all_embeddings = Vec::with_capacity(items.len());
        let mut total_tokens: u64 = 0;
        let engine = BatchRetry {
            backend: &self.backend,
            config: &self.config,
            options,
        };

        for batch in split_batches(items, self.config.batch_size) {
            tracing::debug!(
                target: "embed-pipeline",
                batch = batch.seq,
                total = batch.total,
                len = batch.items.len(),
                "embedding batch"
            );
            match engine.run(&batch).await {
                Ok(outcome) => {
                    total_tokens += outcome.tokens;
                    tracing::debug!(
                        target: "embed-pipeline",
                        batch = batch.seq,
                        tokens = outcome.tokens,
                        total_tokens,
                        "batch complete"
                    );
                    all_embeddings.extend(outcome.embeddings);
                }
                Err(err) if err.is_fatal() => {
                    // The aborted batch contributes nothing, and a
                    // balance error will fail every later batch too.
                    tracing::error!(
                        target: "embed-pipeline",
                        batch = batch.seq,
                        error = %err,
                        "fatal API condition, abandoning remaining batches"
                    );
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(tracker) = &self.tracker {
            tracker.track_usage(
                "embeddings",
                TokenUsage {
                    prompt_tokens: total_tokens,
                    completion_tokens: 0,
                    total_tokens,
                },
            );
        }
        tracing::debug!(
            target: "embed-pipeline",
            generated = all_embeddings.len(),
            total_tokens,
            "embedding run complete"
        );
        Ok(EmbeddingResult {
            embeddings: all_embeddings,
            tokens: total_tokens,
        })
    }
}
