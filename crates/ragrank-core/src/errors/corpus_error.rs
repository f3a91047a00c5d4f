use super::error_code::{self, RagErrorCode};

/// Errors loading the document corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed CSV in {path}: {reason}")]
    Csv { path: String, reason: String },

    #[error("column {column:?} not found; available: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("corpus has no documents with text")]
    Empty,
}

impl RagErrorCode for CorpusError {
    fn error_code(&self) -> &'static str {
        error_code::CORPUS_ERROR
    }
}
