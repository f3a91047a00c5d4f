//! Remote embedding provider for OpenAI/Mistral-compatible `/v1/embeddings` APIs.

use std::time::Duration;

use ragrank_core::config::{defaults, EmbeddingConfig};
use ragrank_core::errors::{EmbeddingError, RagResult};
use ragrank_core::traits::IEmbeddingProvider;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::vector_ops::{l2_normalize, validate_dimensions};

/// Embeds text by calling a hosted embeddings endpoint.
pub struct RemoteProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl RemoteProvider {
    /// Build a client from config. The API key is read from `RAGRANK_API_KEY`.
    pub fn from_config(config: &EmbeddingConfig) -> RagResult<Self> {
        let api_key = std::env::var(defaults::DEFAULT_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EmbeddingError::ProviderUnavailable {
                provider: format!("remote: {} is not set", defaults::DEFAULT_API_KEY_ENV),
            })?;
        Self::new(
            &config.endpoint,
            &config.model_name,
            api_key,
            config.dimensions,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: String,
        dimensions: usize,
        timeout: Duration,
    ) -> RagResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::ProviderUnavailable {
                provider: format!("remote: failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key,
            dimensions,
        })
    }

    fn request(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let failed = |reason: String| EmbeddingError::InferenceFailed { reason };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.trim())
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .map_err(|e| failed(format!("embeddings request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(failed(format!("embeddings endpoint returned {status}: {body}")).into());
        }

        let mut parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| failed(format!("malformed embeddings response: {e}")))?;

        if parsed.data.len() != texts.len() {
            return Err(failed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            ))
            .into());
        }

        // Providers may return items out of order; `index` is authoritative.
        parsed.data.sort_by_key(|d| d.index);
        debug!(count = texts.len(), model = %self.model, "remote embeddings received");

        parsed
            .data
            .into_iter()
            .map(|d| {
                let mut v = d.embedding;
                validate_dimensions(&v, self.dimensions)?;
                l2_normalize(&mut v);
                Ok(v)
            })
            .collect()
    }
}

impl IEmbeddingProvider for RemoteProvider {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut out = self.request(&[text.to_string()])?;
        out.pop().ok_or_else(|| {
            EmbeddingError::InferenceFailed {
                reason: "empty embeddings response".to_string(),
            }
            .into()
        })
    }

    fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        self.request(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        true
    }
}
