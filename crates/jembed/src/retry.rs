use std::collections::HashSet;

use tokio::time;

use crate::batch::Batch;
use crate::config::{EmbedConfig, EmbedOptions};
use crate::error::{EmbedError, ErrorKind};
use crate::input::InputItem;
use crate::providers::jina::JinaBackend;
use crate::sanitize::sanitize_item;

/// Maps "position within the current retry round" back to "position
/// within the original batch".
///
/// Each round re-sends only the unresolved subset, and the endpoint
/// numbers its response from 0 for whatever it received, so every
/// returned index has to be translated back before a vector can be
/// placed. Rebuilt one entry smaller (at least) every round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap(Vec<usize>);

impl IndexMap {
    /// Initial map for a fresh batch: round position == batch position.
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    pub fn forward(&self, current: usize) -> Result<usize, EmbedError> {
        self.0
            .get(current)
            .copied()
            .ok_or(EmbedError::UnknownRoundIndex(current))
    }

    /// Renumber the surviving round positions 0..k-1 in their relative
    /// order, each still pointing at its original batch position.
    pub fn rebuild(&self, surviving: &[usize]) -> Result<Self, EmbedError> {
        surviving
            .iter()
            .map(|&idx| self.forward(idx))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Embeddings and token usage produced for one batch.
#[derive(Debug)]
pub(crate) struct BatchOutcome {
    /// Exactly one vector per item in the batch, in original order.
    pub embeddings: Vec<Vec<f32>>,
    pub tokens: u64,
}

/// Drives one batch to completion: re-sends the shrinking unresolved
/// subset until everything is placed, retries are exhausted, or a
/// fatal error aborts the batch.
pub(crate) struct BatchRetry<'a> {
    pub backend: &'a JinaBackend,
    pub config: &'a EmbedConfig,
    pub options: &'a EmbedOptions,
}

impl BatchRetry<'_> {
    pub async fn run(&self, batch: &Batch<'_>) -> Result<BatchOutcome, EmbedError> {
        let mut texts: Vec<InputItem> = batch.items.iter().map(sanitize_item).collect();
        let mut index_map = IndexMap::identity(texts.len());
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; batch.items.len()];
        let mut tokens: u64 = 0;
        let mut retry_count: u32 = 0;

        while !texts.is_empty() && retry_count < self.config.max_retries {
            match self.backend.embed_call(&texts, self.options).await {
                Err(err) if err.kind() == ErrorKind::Retryable => {
                    tracing::error!(
                        target: "embed-pipeline",
                        batch = batch.seq,
                        total = batch.total,
                        error = %err,
                        "embedding request failed"
                    );
                    retry_count += 1;
                    if retry_count < self.config.max_retries {
                        tracing::debug!(
                            target: "embed-pipeline",
                            batch = batch.seq,
                            total = batch.total,
                            attempt = retry_count,
                            max = self.config.max_retries,
                            "retrying after error"
                        );
                        time::sleep(self.config.retry_backoff()).await;
                    }
                }
                // Fatal and internal errors abort the batch outright.
                Err(err) => return Err(err),
                Ok(call) if call.data.is_empty() => {
                    tracing::error!(
                        target: "embed-pipeline",
                        batch = batch.seq,
                        "no data returned from embedding API"
                    );
                    retry_count += 1;
                }
                Ok(call) => {
                    tokens += call.total_tokens;
                    let received: HashSet<usize> = call.data.iter().map(|(i, _)| *i).collect();
                    for (round_idx, vector) in call.data {
                        let original = index_map.forward(round_idx)?;
                        slots[original] = Some(vector);
                    }

                    let misses: Vec<usize> =
                        (0..texts.len()).filter(|i| !received.contains(i)).collect();
                    if misses.is_empty() {
                        break;
                    }
                    for &i in &misses {
                        tracing::warn!(
                            target: "embed-pipeline",
                            round_index = i,
                            input = %texts[i].preview(),
                            "missing embedding, will retry"
                        );
                    }
                    let next_map = index_map.rebuild(&misses)?;
                    texts = misses.iter().map(|&i| texts[i].clone()).collect();
                    index_map = next_map;
                    retry_count += 1;
                    tracing::debug!(
                        target: "embed-pipeline",
                        batch = batch.seq,
                        total = batch.total,
                        remaining = texts.len(),
                        attempt = retry_count,
                        max = self.config.max_retries,
                        "retrying unresolved subset"
                    );
                }
            }
        }

        // Single fill path for everything the loop left unresolved,
        // whichever way it exited.
        let dims = self
            .options
            .dimensions
            .unwrap_or(self.config.default_dimensions);
        let mut embeddings = Vec::with_capacity(slots.len());
        for (original_idx, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(vector) => embeddings.push(vector),
                None => {
                    tracing::error!(
                        target: "embed-pipeline",
                        batch = batch.seq,
                        original_idx,
                        input = %batch.items[original_idx].preview(),
                        "no embedding after all retries, using zero vector"
                    );
                    embeddings.push(vec![0.0; dims]);
                }
            }
        }

        Ok(BatchOutcome { embeddings, tokens })
    }
}
