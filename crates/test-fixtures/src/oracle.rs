use std::sync::atomic::{AtomicUsize, Ordering};

use ragrank_core::errors::{RagResult, RescoreError};
use ragrank_core::traits::IRelevanceOracle;

type Script = Box<dyn Fn(&str) -> Result<String, String> + Send + Sync>;

/// Relevance oracle answering from a script instead of a model.
pub struct ScriptedOracle {
    script: Script,
    available: bool,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    /// `script` receives the full prompt. `Err` is a transport failure.
    pub fn from_fn<F>(script: F) -> Self
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            available: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers "9" when the document mentions the query's `topic_NNN` token,
    /// "3" otherwise.
    pub fn topic_match() -> Self {
        Self::from_fn(|prompt| {
            let (query, document) = split_prompt(prompt);
            let relevant = query
                .split_whitespace()
                .find(|w| w.starts_with("topic_"))
                .is_some_and(|topic| document.split_whitespace().any(|w| w == topic));
            Ok(if relevant { "9" } else { "3" }.to_string())
        })
    }

    /// Same response for every prompt.
    pub fn constant(response: &str) -> Self {
        let response = response.to_string();
        Self::from_fn(move |_| Ok(response.clone()))
    }

    /// Every request fails at the transport level.
    pub fn unreachable() -> Self {
        Self::from_fn(|_| Err("connection refused".to_string()))
    }

    /// Reports itself unavailable; requests are never sent.
    pub fn unavailable() -> Self {
        let mut oracle = Self::constant("5");
        oracle.available = false;
        oracle
    }

    /// Requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Query and document sections of a relevance prompt.
fn split_prompt(prompt: &str) -> (&str, &str) {
    let query = prompt
        .lines()
        .find_map(|l| l.strip_prefix("Query: "))
        .unwrap_or("");
    let document = prompt
        .split_once("\nDocument: ")
        .map(|(_, rest)| rest.rsplit_once("\nRelevance").map_or(rest, |(d, _)| d))
        .unwrap_or("");
    (query, document)
}

impl IRelevanceOracle for ScriptedOracle {
    fn complete(&self, _model: &str, prompt: &str) -> RagResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(prompt).map_err(|reason| RescoreError::RescoringUnavailable { reason }.into())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
