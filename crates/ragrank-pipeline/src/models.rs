//! Query results handed back to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ragrank_core::models::{IndexId, RelevanceScore};

/// One retrieved document in final order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDocument {
    pub row_id: usize,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    /// `None` when the answer was not rescored.
    pub score: Option<RelevanceScore>,
    /// Distance from the initial vector search.
    pub distance: f32,
}

impl RankedDocument {
    /// `Document: {text}, Distance: {distance:.4}`
    pub fn display(&self) -> String {
        format!("Document: {}, Distance: {:.4}", self.text, self.distance)
    }
}

/// Result of `Pipeline::answer_query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub index_id: IndexId,
    pub query: String,
    pub results: Vec<RankedDocument>,
    /// Candidates whose relevance could not be determined.
    pub unknown_scores: usize,
    /// False when the ranking is the plain distance order.
    pub rescored: bool,
}

impl QueryAnswer {
    pub fn best(&self) -> Option<&RankedDocument> {
        self.results.first()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn row_ids(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.row_id).collect()
    }
}
