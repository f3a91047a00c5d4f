//! Error handling for ragrank.
//! One error enum per subsystem, `thiserror` only, aggregated into [`RagError`].

pub mod artifact_error;
pub mod config_error;
pub mod corpus_error;
pub mod embedding_error;
pub mod error_code;
pub mod index_error;
pub mod rescore_error;

pub use artifact_error::ArtifactError;
pub use config_error::ConfigError;
pub use corpus_error::CorpusError;
pub use embedding_error::EmbeddingError;
pub use error_code::RagErrorCode;
pub use index_error::IndexError;
pub use rescore_error::RescoreError;

/// Top-level error for every ragrank operation.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("index error: {0}")]
    IndexError(#[from] IndexError),

    #[error("rescoring error: {0}")]
    RescoreError(#[from] RescoreError),

    #[error("artifact error: {0}")]
    ArtifactError(#[from] ArtifactError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("corpus error: {0}")]
    CorpusError(#[from] CorpusError),

    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// The external answer generator failed.
    #[error("answer generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl RagError {
    /// True for `InsufficientData`, whichever parameter triggered it.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::IndexError(IndexError::InsufficientData { .. }))
    }

    /// True when the relevance oracle could not be reached for a whole batch.
    pub fn is_rescoring_unavailable(&self) -> bool {
        matches!(
            self,
            Self::RescoreError(RescoreError::RescoringUnavailable { .. })
        )
    }

    /// True when the persisted projection/index/documents set is inconsistent.
    pub fn is_artifact_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ArtifactError(ArtifactError::IndexArtifactMismatch { .. })
        )
    }
}

impl RagErrorCode for RagError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::IndexError(e) => e.error_code(),
            Self::RescoreError(e) => e.error_code(),
            Self::ArtifactError(e) => e.error_code(),
            Self::EmbeddingError(e) => e.error_code(),
            Self::CorpusError(e) => e.error_code(),
            Self::ConfigError(e) => e.error_code(),
            Self::GenerationFailed { .. } => error_code::GENERATION_FAILED,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type RagResult<T> = Result<T, RagError>;
