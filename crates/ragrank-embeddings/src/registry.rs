//! Process-wide registry of loaded embedding engines.
//!
//! Loading a model is expensive, so each distinct model configuration is
//! loaded at most once and shared through `Arc` until explicitly released.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use ragrank_core::config::EmbeddingConfig;
use tracing::{debug, info};

use crate::engine::EmbeddingEngine;

static GLOBAL: LazyLock<ModelRegistry> = LazyLock::new(ModelRegistry::new);

/// Keyed store of loaded engines. Keys come from `EmbeddingConfig::model_key`.
#[derive(Default)]
pub struct ModelRegistry {
    engines: Mutex<HashMap<String, Arc<EmbeddingEngine>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide registry.
    pub fn global() -> &'static ModelRegistry {
        &GLOBAL
    }

    /// Return the engine for `config`, loading it on first use.
    ///
    /// The lock is held across the load so concurrent callers never load
    /// the same model twice.
    pub fn get_or_load(&self, config: &EmbeddingConfig) -> Arc<EmbeddingEngine> {
        let key = config.model_key();
        let mut engines = match self.engines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(engine) = engines.get(&key) {
            debug!(model = %key, "embedding model reused");
            return Arc::clone(engine);
        }
        let engine = Arc::new(EmbeddingEngine::new(config.clone()));
        info!(model = %key, provider = engine.active_provider(), "embedding model loaded");
        engines.insert(key, Arc::clone(&engine));
        engine
    }

    /// Drop the registry's handle for `key`. Returns whether one was held.
    /// Callers still holding an `Arc` keep their engine alive.
    pub fn release(&self, key: &str) -> bool {
        let released = self
            .engines
            .lock()
            .map(|mut engines| engines.remove(key).is_some())
            .unwrap_or(false);
        if released {
            info!(model = %key, "embedding model released");
        }
        released
    }

    /// Release every loaded model.
    pub fn release_all(&self) {
        if let Ok(mut engines) = self.engines.lock() {
            engines.clear();
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.engines.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_loaded(&self, key: &str) -> bool {
        self.engines
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dims: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "tfidf".to_string(),
            dimensions: dims,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn same_config_loads_once() {
        let registry = ModelRegistry::new();
        let a = registry.get_or_load(&config(32));
        let b = registry.get_or_load(&config(32));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.loaded_count(), 1);
    }

    #[test]
    fn distinct_configs_load_separately() {
        let registry = ModelRegistry::new();
        registry.get_or_load(&config(32));
        registry.get_or_load(&config(64));
        assert_eq!(registry.loaded_count(), 2);
    }

    #[test]
    fn release_drops_registry_handle_only() {
        let registry = ModelRegistry::new();
        let cfg = config(16);
        let held = registry.get_or_load(&cfg);
        assert!(registry.release(&cfg.model_key()));
        assert!(!registry.is_loaded(&cfg.model_key()));
        assert!(!registry.release(&cfg.model_key()));
        // The caller's handle still works.
        assert_eq!(held.embed_query("still alive").unwrap().len(), 16);

        let reloaded = registry.get_or_load(&cfg);
        assert!(!Arc::ptr_eq(&held, &reloaded));
    }

    #[test]
    fn release_all_empties_registry() {
        let registry = ModelRegistry::new();
        registry.get_or_load(&config(8));
        registry.get_or_load(&config(9));
        registry.release_all();
        assert_eq!(registry.loaded_count(), 0);
    }
}
