use super::error_code::{self, RagErrorCode};

/// Errors reading or writing persisted index artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// The projection, index and documents on disk do not belong together.
    #[error("index artifact mismatch for {index_id}: {details}")]
    IndexArtifactMismatch { index_id: String, details: String },

    #[error("invalid index id {index_id:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidIndexId { index_id: String },

    #[error("no artifacts found for index {index_id} under {path}")]
    NotFound { index_id: String, path: String },

    #[error("artifact I/O failed at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("artifact serialization failed for {path}: {reason}")]
    Serialization { path: String, reason: String },
}

impl RagErrorCode for ArtifactError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::IndexArtifactMismatch { .. } => error_code::INDEX_ARTIFACT_MISMATCH,
            _ => error_code::ARTIFACT_ERROR,
        }
    }
}
