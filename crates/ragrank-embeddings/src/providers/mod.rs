//! Embedding providers and the factory that picks one from config.

pub mod onnx_provider;
pub mod remote_provider;
pub mod tfidf_fallback;

pub use onnx_provider::OnnxProvider;
pub use remote_provider::RemoteProvider;
pub use tfidf_fallback::TfIdfFallback;

use ragrank_core::config::EmbeddingConfig;
use ragrank_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Build the primary provider named by `config.provider`.
///
/// A provider that cannot be constructed (missing model file, bad client
/// config) degrades to the TF-IDF fallback with a warning.
pub fn create_provider(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    match config.provider.as_str() {
        "onnx" => {
            let Some(path) = config.model_path.as_deref() else {
                warn!("onnx provider selected without model_path, using tfidf");
                return Box::new(TfIdfFallback::new(config.dimensions));
            };
            match OnnxProvider::load(path, config.dimensions) {
                Ok(p) => Box::new(p),
                Err(e) => {
                    warn!(error = %e, path, "failed to load ONNX model, using tfidf");
                    Box::new(TfIdfFallback::new(config.dimensions))
                }
            }
        }
        "remote" => match RemoteProvider::from_config(config) {
            Ok(p) => Box::new(p),
            Err(e) => {
                warn!(error = %e, endpoint = %config.endpoint, "remote provider unavailable, using tfidf");
                Box::new(TfIdfFallback::new(config.dimensions))
            }
        },
        _ => Box::new(TfIdfFallback::new(config.dimensions)),
    }
}
