//! Oracle and answer generator backed by an OpenAI/Mistral-compatible
//! `/v1/chat/completions` endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ragrank_core::config::RerankConfig;
use ragrank_core::errors::{RagError, RagResult, RescoreError};
use ragrank_core::traits::{IAnswerGenerator, IRelevanceOracle};

/// Blocking chat-completions client. Requests use temperature 0 so the same
/// prompt keeps producing the same rating.
pub struct HttpChatOracle {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

impl HttpChatOracle {
    /// Build from the rerank section. A missing key is not an error here;
    /// the oracle simply reports itself unavailable.
    pub fn from_config(config: &RerankConfig) -> RagResult<Self> {
        Self::new(
            &config.endpoint,
            &config.model,
            config.resolve_api_key(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn new(endpoint: &str, model: &str, api_key: Option<String>, timeout: Duration) -> RagResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RescoreError::RescoringUnavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat(&self, model: &str, messages: Vec<ChatMessage<'_>>) -> Result<String, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "no API key configured".to_string())?;

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.trim())
            .json(&ChatRequest {
                model,
                temperature: 0.0,
                messages,
            })
            .send()
            .map_err(|e| format!("chat request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(format!("chat endpoint returned {status}: {body}"));
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| format!("malformed chat response: {e}"))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| "chat response has no choices".to_string())?;
        debug!(model, chars = content.len(), "chat completion received");
        Ok(content)
    }
}

impl IRelevanceOracle for HttpChatOracle {
    fn complete(&self, model: &str, prompt: &str) -> RagResult<String> {
        self.chat(
            model,
            vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        )
        .map_err(|reason| RescoreError::RescoringUnavailable { reason }.into())
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        "http-chat"
    }
}

impl IAnswerGenerator for HttpChatOracle {
    /// History alternates user and assistant turns, oldest first.
    fn generate(&self, prompt: &str, history: &[String]) -> RagResult<String> {
        let mut messages: Vec<ChatMessage<'_>> = history
            .iter()
            .enumerate()
            .map(|(i, turn)| ChatMessage {
                role: if i % 2 == 0 { "user" } else { "assistant" },
                content: turn,
            })
            .collect();
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        self.chat(&self.model, messages)
            .map_err(|reason| RagError::GenerationFailed { reason })
    }
}
