use crate::errors::RagResult;

/// External relevance oracle: a language model asked to rate a document.
///
/// Implementations are called concurrently from the rescoring pool.
pub trait IRelevanceOracle: Send + Sync {
    /// Send one prompt and return the raw response text.
    ///
    /// Transport failures are reported as `RescoreError::RescoringUnavailable`.
    /// The response format is not guaranteed beyond "contains a number somewhere".
    fn complete(&self, model: &str, prompt: &str) -> RagResult<String>;

    /// Cheap pre-flight check. `false` fails the batch without sending requests.
    fn is_available(&self) -> bool {
        true
    }

    /// Human-readable oracle name.
    fn name(&self) -> &str;
}
