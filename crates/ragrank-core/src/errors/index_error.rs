use super::error_code::{self, RagErrorCode};

/// Projection and vector-index errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Too few vectors for the requested dimension or cluster count.
    #[error("insufficient data for {parameter}: need at least {required} vectors, got {available}")]
    InsufficientData {
        parameter: &'static str,
        required: usize,
        available: usize,
    },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("non-finite value in vector {row}")]
    NonFiniteInput { row: usize },
}

impl RagErrorCode for IndexError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => error_code::INSUFFICIENT_DATA,
            _ => error_code::INDEX_ERROR,
        }
    }
}
