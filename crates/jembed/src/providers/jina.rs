use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{EmbedConfig, EmbedOptions, DEFAULT_TASK};
use crate::error::{truncate_string, EmbedError};
use crate::input::InputItem;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [InputItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    late_chunking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding_type: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    // A missing or empty `data` array is a degenerate success the
    // retry engine handles; everything else about the shape is strict.
    #[serde(default)]
    data: Vec<EmbeddingObject>,
    #[serde(default)]
    usage: UsageObject,
}

#[derive(Deserialize)]
struct EmbeddingObject {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize, Default)]
struct UsageObject {
    // `prompt_tokens` mirrors `total_tokens` on this endpoint.
    #[serde(default)]
    total_tokens: u64,
}

/// Result of one successful call: vectors keyed by their index within
/// this round's request (a strict subset of the submitted items is
/// legal and expected), plus the usage reported for the call.
#[derive(Debug, Default)]
pub(crate) struct CallSuccess {
    pub data: Vec<(usize, Vec<f32>)>,
    pub total_tokens: u64,
}

/// Stateless client for the embedding endpoint: one POST per call, no
/// state carried across calls.
#[derive(Debug)]
pub struct JinaBackend {
    api_url: String,
    client: reqwest::Client,
}

impl JinaBackend {
    pub fn new(config: &EmbedConfig) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EmbedError::Network(e.to_string()))?;
        Ok(Self {
            api_url: config.api_url.clone(),
            client,
        })
    }

    fn build_request<'a>(
        &self,
        input: &'a [InputItem],
        options: &'a EmbedOptions,
    ) -> EmbedRequest<'a> {
        let default_model = options.is_default_model();
        EmbedRequest {
            model: &options.model,
            input,
            task: default_model.then(|| options.task.as_deref().unwrap_or(DEFAULT_TASK)),
            truncate: default_model.then_some(true),
            dimensions: options.dimensions,
            late_chunking: options.late_chunking,
            embedding_type: options.embedding_type.as_deref(),
        }
    }

    /// Issue one embedding request for `input`.
    ///
    /// HTTP 402 maps to [`EmbedError::InsufficientBalance`] (fatal);
    /// every other transport, status or decode failure maps to a
    /// retryable variant. Classification happens here, by status code,
    /// so nothing downstream inspects error text.
    pub(crate) async fn embed_call(
        &self,
        input: &[InputItem],
        options: &EmbedOptions,
    ) -> Result<CallSuccess, EmbedError> {
        let request = self.build_request(input, options);
        let res = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbedError::Network(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = truncate_string(&res.text().await.unwrap_or_default(), 200);
            return Err(match status.as_u16() {
                402 => EmbedError::InsufficientBalance { status: 402, body },
                code => EmbedError::Http { status: code, body },
            });
        }

        let response: EmbedResponse = res
            .json()
            .await
            .map_err(|e| EmbedError::Decode(e.to_string()))?;

        // Indices are scoped to this request's `input`; reject anything
        // the retry engine could not place.
        let mut seen: HashSet<usize> = HashSet::with_capacity(response.data.len());
        let mut data = Vec::with_capacity(response.data.len());
        for item in response.data {
            if item.index >= input.len() {
                return Err(EmbedError::Decode(format!(
                    "response index {} out of range for {} inputs",
                    item.index,
                    input.len()
                )));
            }
            if !seen.insert(item.index) {
                return Err(EmbedError::Decode(format!(
                    "response contains duplicate index {}",
                    item.index
                )));
            }
            data.push((item.index, item.embedding));
        }

        Ok(CallSuccess {
            data,
            total_tokens: response.usage.total_tokens,
        })
    }
}
