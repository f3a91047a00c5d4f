use crate::errors::RagResult;

/// Embedding generation provider.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text, returning a vector of floats.
    fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    /// Embed a batch of texts. One vector per text, same order.
    fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>>;

    /// Embed a batch and report which model actually produced the vectors.
    ///
    /// Providers that can fall back to another model override this so callers
    /// can refuse to mix vectors from different embedding spaces.
    fn embed_batch_with_source(&self, texts: &[String]) -> RagResult<(Vec<Vec<f32>>, String)> {
        Ok((self.embed_batch(texts)?, self.name().to_string()))
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
