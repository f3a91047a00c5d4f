//! Relevance rescoring of a candidate set.
//!
//! One oracle request per candidate, fanned out on a bounded rayon pool.
//! Responses are keyed by row id and reassembled in candidate order before
//! fusion. A bad response degrades that one candidate to
//! `RelevanceScore::Unknown`; only an oracle that fails every request (or
//! reports itself unavailable) fails the batch.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info_span, warn};

use ragrank_core::config::RerankConfig;
use ragrank_core::errors::{RagResult, RescoreError};
use ragrank_core::models::{Candidate, CandidateSet, RelevanceScore, RescoredCandidate, RescoredSet};
use ragrank_core::traits::IRelevanceOracle;

use crate::fusion::fuse;
use crate::lookup::DocumentLookup;
use crate::prompt::relevance_prompt;
use crate::score_parser::parse_score;

/// What happened to one candidate.
#[derive(Debug)]
enum Outcome {
    Scored(u32),
    Unparsable(String),
    MissingText,
    Transport(String),
}

/// Rescores candidate sets against an external relevance oracle.
pub struct Rescorer {
    oracle: Arc<dyn IRelevanceOracle>,
    model: String,
    max_document_chars: usize,
    pool: ThreadPool,
}

impl Rescorer {
    /// Build a rescorer with `config.workers` concurrent requests.
    pub fn new(oracle: Arc<dyn IRelevanceOracle>, config: &RerankConfig) -> RagResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("ragrank-rescore-{i}"))
            .build()
            .map_err(|e| RescoreError::RescoringUnavailable {
                reason: format!("failed to start rescoring pool: {e}"),
            })?;
        Ok(Self {
            oracle,
            model: config.model.clone(),
            max_document_chars: config.max_document_chars,
            pool,
        })
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Rescore `candidates` for `query`.
    ///
    /// # Errors
    /// `RescoringUnavailable` when the oracle reports itself unavailable or
    /// every request fails at the transport level. Per-candidate failures
    /// never surface as errors; they are counted in `unknown_count`.
    pub fn rescore<L>(&self, query: &str, candidates: &CandidateSet, documents: &L) -> RagResult<RescoredSet>
    where
        L: DocumentLookup + ?Sized,
    {
        if candidates.is_empty() {
            return Ok(RescoredSet::default());
        }
        let _span = info_span!("rescore", candidates = candidates.len(), oracle = self.oracle.name()).entered();

        if !self.oracle.is_available() {
            return Err(RescoreError::RescoringUnavailable {
                reason: format!("oracle {} reports unavailable", self.oracle.name()),
            }
            .into());
        }

        let outcomes: HashMap<usize, Outcome> = self.pool.install(|| {
            candidates
                .as_slice()
                .par_iter()
                .map(|c| (c.row_id, self.score_one(query, c, documents)))
                .collect()
        });

        let attempted = outcomes
            .values()
            .filter(|o| !matches!(o, Outcome::MissingText))
            .count();
        let transport_failures: Vec<&str> = outcomes
            .values()
            .filter_map(|o| match o {
                Outcome::Transport(reason) => Some(reason.as_str()),
                _ => None,
            })
            .collect();
        if attempted > 0 && transport_failures.len() == attempted {
            return Err(RescoreError::RescoringUnavailable {
                reason: format!(
                    "all {attempted} scoring requests failed; first: {}",
                    transport_failures[0]
                ),
            }
            .into());
        }

        let mut unknown_count = 0;
        let entries: Vec<RescoredCandidate> = candidates
            .iter()
            .map(|c| {
                let score = match outcomes.get(&c.row_id) {
                    Some(Outcome::Scored(s)) => RelevanceScore::Rated(*s),
                    Some(Outcome::Unparsable(response)) => {
                        let err = RescoreError::UnparsableScore {
                            row_id: c.row_id,
                            response: response.clone(),
                        };
                        warn!(error = %err, "treating candidate score as unknown");
                        RelevanceScore::Unknown
                    }
                    Some(Outcome::MissingText) => {
                        warn!(row_id = c.row_id, "no document text for candidate");
                        RelevanceScore::Unknown
                    }
                    Some(Outcome::Transport(reason)) => {
                        warn!(row_id = c.row_id, reason = %reason, "scoring request failed");
                        RelevanceScore::Unknown
                    }
                    None => RelevanceScore::Unknown,
                };
                if score.is_unknown() {
                    unknown_count += 1;
                }
                RescoredCandidate {
                    row_id: c.row_id,
                    score,
                    distance: c.distance,
                    original_rank: c.rank,
                }
            })
            .collect();

        let rescored = RescoredSet {
            entries: fuse(entries),
            unknown_count,
        };
        debug!(
            scored = rescored.len() - unknown_count,
            unknown = unknown_count,
            best = ?rescored.best().map(|b| b.row_id),
            "rescoring complete"
        );
        Ok(rescored)
    }

    fn score_one<L>(&self, query: &str, candidate: &Candidate, documents: &L) -> Outcome
    where
        L: DocumentLookup + ?Sized,
    {
        let Some(text) = documents.document_text(candidate.row_id) else {
            return Outcome::MissingText;
        };
        let prompt = relevance_prompt(query, text, self.max_document_chars);
        match self.oracle.complete(&self.model, &prompt) {
            Ok(response) => match parse_score(&response) {
                Some(score) => Outcome::Scored(score),
                None => Outcome::Unparsable(response),
            },
            Err(e) => Outcome::Transport(e.to_string()),
        }
    }
}
