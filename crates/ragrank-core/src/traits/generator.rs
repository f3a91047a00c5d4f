use crate::errors::RagResult;

/// Conversational answer generator fed with the retrieved context.
pub trait IAnswerGenerator: Send + Sync {
    /// `history` holds previous turns, oldest first.
    fn generate(&self, prompt: &str, history: &[String]) -> RagResult<String>;
}
