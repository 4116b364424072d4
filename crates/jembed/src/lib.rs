//! Client-side batching and retry orchestration for a remote embedding
//! endpoint.
//!
//! The pipeline splits an input list into fixed-size batches, submits
//! each batch, retries only the subset the endpoint did not answer for
//! (with indices renumbered per round), and degrades unresolved items
//! to zero vectors once retries run out. Callers get back one vector
//! per input item, in input order, plus the aggregate token usage.

pub mod batch;
pub mod config;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod providers;
pub mod retry;
pub mod sanitize;

pub use config::{EmbedConfig, EmbedOptions};
pub use error::{EmbedError, ErrorKind};
pub use input::InputItem;
pub use orchestrator::{EmbeddingResult, EmbeddingsOrchestrator, TokenUsage, UsageTracker};
