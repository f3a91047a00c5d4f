//! Stable, machine-readable error codes.

pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
pub const INDEX_ERROR: &str = "INDEX_ERROR";
pub const UNPARSABLE_SCORE: &str = "UNPARSABLE_SCORE";
pub const RESCORING_UNAVAILABLE: &str = "RESCORING_UNAVAILABLE";
pub const INDEX_ARTIFACT_MISMATCH: &str = "INDEX_ARTIFACT_MISMATCH";
pub const ARTIFACT_ERROR: &str = "ARTIFACT_ERROR";
pub const EMBEDDING_ERROR: &str = "EMBEDDING_ERROR";
pub const CORPUS_ERROR: &str = "CORPUS_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const GENERATION_FAILED: &str = "GENERATION_FAILED";
pub const CANCELLED: &str = "CANCELLED";

/// Implemented by every error enum in the workspace.
pub trait RagErrorCode {
    fn error_code(&self) -> &'static str;
}
