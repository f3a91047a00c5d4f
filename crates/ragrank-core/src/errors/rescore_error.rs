use super::error_code::{self, RagErrorCode};

/// Relevance rescoring errors.
#[derive(Debug, thiserror::Error)]
pub enum RescoreError {
    /// The oracle answered but the answer held no integer. Per-candidate.
    #[error("unparsable relevance score for row {row_id}: {response:?}")]
    UnparsableScore { row_id: usize, response: String },

    /// The oracle could not be reached for the batch.
    #[error("rescoring unavailable: {reason}")]
    RescoringUnavailable { reason: String },
}

impl RagErrorCode for RescoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnparsableScore { .. } => error_code::UNPARSABLE_SCORE,
            Self::RescoringUnavailable { .. } => error_code::RESCORING_UNAVAILABLE,
        }
    }
}
