//! EmbeddingEngine, the main entry point for ragrank-embeddings.
//!
//! Coordinates provider selection, the fallback chain and the L1 cache.
//! Implements `IEmbeddingProvider`.

use ragrank_core::config::EmbeddingConfig;
use ragrank_core::errors::{EmbeddingError, RagResult};
use ragrank_core::models::DegradationEvent;
use ragrank_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::{L1MemoryCache, TextKey};
use crate::degradation::DegradationChain;
use crate::providers;
use crate::vector_ops::validate_dimensions;

/// The main embedding engine.
///
/// Wraps provider selection, caching and fallback into a single interface.
/// All methods take `&self` so one engine can be shared across threads.
pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: L1MemoryCache,
    config: EmbeddingConfig,
}

impl EmbeddingEngine {
    /// Create a new engine from configuration.
    pub fn new(config: EmbeddingConfig) -> Self {
        let mut chain = DegradationChain::new();
        let primary = providers::create_provider(&config);
        let primary_is_tfidf = primary.name() == providers::TfIdfFallback::NAME;
        chain.push(primary);
        if !primary_is_tfidf {
            chain.push(Box::new(providers::TfIdfFallback::new(config.dimensions)));
        }

        let cache = L1MemoryCache::new(config.l1_cache_size);

        info!(
            provider = chain.active_provider_name(),
            dims = config.dimensions,
            "EmbeddingEngine initialized"
        );

        Self {
            chain,
            cache,
            config,
        }
    }

    /// Embed a query string. Cached.
    pub fn embed_query(&self, query: &str) -> RagResult<Vec<f32>> {
        let (mut vecs, _) = self.embed_texts(&[query.to_string()])?;
        vecs.pop().ok_or_else(|| {
            EmbeddingError::InferenceFailed {
                reason: "provider returned no vector".to_string(),
            }
            .into()
        })
    }

    /// Embed a batch of texts, serving cache hits and embedding the rest in one
    /// provider call. Returns the vectors and the name of the producing model.
    ///
    /// Only vectors from the primary provider are cached, so a transient
    /// fallback never poisons later lookups.
    pub fn embed_texts(&self, texts: &[String]) -> RagResult<(Vec<Vec<f32>>, String)> {
        let keys: Vec<TextKey> = texts.iter().map(|t| TextKey::of(t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = keys.iter().map(|k| self.cache.get(k)).collect();

        let misses: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();
        let primary = self.chain.primary_name().to_string();
        if misses.is_empty() {
            debug!(count = texts.len(), "all embeddings served from cache");
            return Ok((out.into_iter().flatten().collect(), primary));
        }

        let pending: Vec<String> = misses.iter().map(|&i| texts[i].clone()).collect();
        let (vecs, provider) = self.chain.embed_batch(&pending)?;
        let provider = provider.to_string();
        if vecs.len() != pending.len() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("expected {} vectors, got {}", pending.len(), vecs.len()),
            }
            .into());
        }

        // A cache hit came from the primary, so a fallback batch cannot be mixed in.
        if provider != primary && misses.len() != texts.len() {
            return self.embed_uncached(texts);
        }

        for (&i, vec) in misses.iter().zip(vecs) {
            validate_dimensions(&vec, self.config.dimensions)?;
            if provider == primary {
                self.cache.insert(keys[i], &vec);
            }
            out[i] = Some(vec);
        }

        debug!(
            count = texts.len(),
            embedded = misses.len(),
            provider = %provider,
            "embedded batch"
        );
        Ok((out.into_iter().flatten().collect(), provider))
    }

    fn embed_uncached(&self, texts: &[String]) -> RagResult<(Vec<Vec<f32>>, String)> {
        let (vecs, provider) = self.chain.embed_batch(texts)?;
        for vec in &vecs {
            validate_dimensions(vec, self.config.dimensions)?;
        }
        Ok((vecs, provider.to_string()))
    }

    /// Drain accumulated degradation events.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        self.chain.drain_events()
    }

    /// Get the active provider name.
    pub fn active_provider(&self) -> &str {
        self.chain.active_provider_name()
    }

    /// Get the configured dimensions.
    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Approximate number of cached vectors.
    pub fn cached_count(&self) -> u64 {
        self.cache.len()
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        self.embed_query(text)
    }

    fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        self.embed_texts(texts).map(|(vecs, _)| vecs)
    }

    fn embed_batch_with_source(&self, texts: &[String]) -> RagResult<(Vec<Vec<f32>>, String)> {
        self.embed_texts(texts)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        self.chain.primary_name()
    }

    fn is_available(&self) -> bool {
        !self.chain.is_empty()
    }
}
