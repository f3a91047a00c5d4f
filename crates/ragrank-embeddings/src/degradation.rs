//! Fallback chain for embedding generation.
//!
//! Providers are tried in priority order. A fallback is logged and recorded
//! as a `DegradationEvent` so callers can tell which model produced a vector.

use std::sync::Mutex;

use chrono::Utc;
use ragrank_core::errors::{EmbeddingError, RagResult};
use ragrank_core::models::DegradationEvent;
use ragrank_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Manages the degradation fallback chain for embedding providers.
pub struct DegradationChain {
    providers: Vec<Box<dyn IEmbeddingProvider>>,
    events: Mutex<Vec<DegradationEvent>>,
}

impl Default for DegradationChain {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationChain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Add a provider to the end of the chain.
    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.providers.push(provider);
    }

    /// Embed a batch with the first provider that succeeds.
    ///
    /// Returns the vectors and the name of the provider that produced them.
    /// The whole batch always comes from a single provider.
    pub fn embed_batch(&self, texts: &[String]) -> RagResult<(Vec<Vec<f32>>, &str)> {
        let mut last_error = None;

        for (i, provider) in self.providers.iter().enumerate() {
            if !provider.is_available() {
                continue;
            }

            match provider.embed_batch(texts) {
                Ok(vecs) => {
                    if i > 0 {
                        self.record_fallback(provider.name());
                    }
                    return Ok((vecs, provider.name()));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        batch = texts.len(),
                        "batch embed failed, trying next in chain"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::ProviderUnavailable {
                provider: "all providers exhausted".to_string(),
            }
            .into()
        }))
    }

    fn record_fallback(&self, fallback: &str) {
        let primary = self
            .providers
            .first()
            .map(|p| p.name())
            .unwrap_or("unknown");
        if let Ok(mut events) = self.events.lock() {
            events.push(DegradationEvent {
                component: "embeddings".to_string(),
                failure: format!("{primary} unavailable"),
                fallback_used: fallback.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Name of the first available provider.
    pub fn active_provider_name(&self) -> &str {
        self.providers
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    /// Name of the highest-priority provider, available or not.
    pub fn primary_name(&self) -> &str {
        self.providers.first().map(|p| p.name()).unwrap_or("none")
    }

    /// Drain accumulated degradation events.
    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragrank_core::errors::RagResult;

    struct FailingProvider;
    impl IEmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn embed_batch(&self, _texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn dimensions(&self) -> usize {
            8
        }
        fn name(&self) -> &str {
            "failing-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    struct ConstProvider {
        name: &'static str,
        dims: usize,
    }
    impl IEmbeddingProvider for ConstProvider {
        fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
            Ok(vec![1.0; self.dims])
        }
        fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0; self.dims]).collect())
        }
        fn dimensions(&self) -> usize {
            self.dims
        }
        fn name(&self) -> &str {
            self.name
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    fn texts() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn primary_succeeds_no_degradation() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(ConstProvider { name: "primary", dims: 8 }));
        chain.push(Box::new(ConstProvider { name: "fallback", dims: 8 }));

        let (vecs, name) = chain.embed_batch(&texts()).unwrap();
        assert_eq!(name, "primary");
        assert_eq!(vecs.len(), 2);
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn fallback_on_primary_failure_is_recorded() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(ConstProvider { name: "fallback", dims: 4 }));

        let (vecs, name) = chain.embed_batch(&texts()).unwrap();
        assert_eq!(name, "fallback");
        assert_eq!(vecs[0].len(), 4);

        let events = chain.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fallback_used, "fallback");
        assert!(events[0].failure.contains("failing-mock"));
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn all_fail_returns_error() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(FailingProvider));
        assert!(chain.embed_batch(&texts()).is_err());
    }

    #[test]
    fn empty_chain_returns_error() {
        let chain = DegradationChain::new();
        assert!(chain.is_empty());
        assert!(chain.embed_batch(&texts()).is_err());
    }
}
