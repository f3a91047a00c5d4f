use serde::{Deserialize, Serialize};

use super::defaults;

/// Relevance rescoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// When false, queries return the distance ranking unscored.
    pub enabled: bool,
    /// Model identifier sent with every scoring request.
    pub model: String,
    /// Chat-completions endpoint of the oracle.
    pub endpoint: String,
    /// API key. Prefer the env var named by `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Env var consulted when `api_key` is unset.
    pub api_key_env: String,
    /// Concurrent scoring requests in flight.
    pub workers: usize,
    pub timeout_secs: u64,
    /// Return the distance ranking when the oracle is unreachable.
    pub fallback_to_distance: bool,
    /// Candidate text longer than this is truncated in the prompt.
    pub max_document_chars: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: defaults::DEFAULT_RERANK_MODEL.to_string(),
            endpoint: defaults::DEFAULT_CHAT_ENDPOINT.to_string(),
            api_key: None,
            api_key_env: defaults::DEFAULT_API_KEY_ENV.to_string(),
            workers: defaults::DEFAULT_RESCORE_WORKERS,
            timeout_secs: defaults::DEFAULT_HTTP_TIMEOUT_SECS,
            fallback_to_distance: true,
            max_document_chars: defaults::DEFAULT_MAX_DOCUMENT_CHARS,
        }
    }
}

impl RerankConfig {
    /// The configured key, else the value of `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}
