//! Rescoring against scripted oracles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ragrank_core::config::RerankConfig;
use ragrank_core::models::{CandidateSet, RelevanceScore};
use ragrank_rerank::Rescorer;
use test_fixtures::{topic_documents, topic_query, ScriptedOracle};

fn config(workers: usize) -> RerankConfig {
    RerankConfig {
        workers,
        ..RerankConfig::default()
    }
}

/// Rows `0..n` at distances `0.1, 0.2, ...`, so original rank equals row id.
fn candidates(n: usize) -> CandidateSet {
    CandidateSet::from_hits((0..n).map(|i| (i, (i + 1) as f32 * 0.1)).collect(), n)
}

fn rows(set: &ragrank_core::models::RescoredSet) -> Vec<usize> {
    set.iter().map(|e| e.row_id).collect()
}

#[test]
fn matching_document_moves_to_the_top() {
    let oracle = Arc::new(ScriptedOracle::topic_match());
    let rescorer = Rescorer::new(oracle.clone(), &config(4)).unwrap();
    let docs = topic_documents(6);

    let result = rescorer.rescore(&topic_query(4), &candidates(6), &docs).unwrap();

    assert_eq!(rows(&result), vec![4, 0, 1, 2, 3, 5]);
    assert_eq!(result.best().unwrap().score, RelevanceScore::Rated(9));
    assert_eq!(result.best().unwrap().original_rank, 4);
    assert_eq!(result.unknown_count, 0);
    assert!(result.is_sorted());
    assert_eq!(oracle.calls(), 6);
}

#[test]
fn empty_candidate_set_sends_nothing() {
    let oracle = Arc::new(ScriptedOracle::topic_match());
    let rescorer = Rescorer::new(oracle.clone(), &config(2)).unwrap();
    let result = rescorer
        .rescore("anything", &CandidateSet::empty(), &topic_documents(3))
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn unavailable_oracle_fails_before_sending() {
    let oracle = Arc::new(ScriptedOracle::unavailable());
    let rescorer = Rescorer::new(oracle.clone(), &config(2)).unwrap();
    let err = rescorer
        .rescore("q", &candidates(3), &topic_documents(3))
        .unwrap_err();
    assert!(err.is_rescoring_unavailable());
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn unreachable_oracle_fails_the_batch() {
    let rescorer = Rescorer::new(Arc::new(ScriptedOracle::unreachable()), &config(3)).unwrap();
    let err = rescorer
        .rescore("q", &candidates(5), &topic_documents(5))
        .unwrap_err();
    assert!(err.is_rescoring_unavailable());
}

#[test]
fn unparsable_responses_become_unknown_in_distance_order() {
    let rescorer = Rescorer::new(Arc::new(ScriptedOracle::constant("I cannot rate this.")), &config(2)).unwrap();
    let result = rescorer
        .rescore("q", &candidates(4), &topic_documents(4))
        .unwrap();
    assert_eq!(result.unknown_count, 4);
    assert_eq!(rows(&result), vec![0, 1, 2, 3]);
    assert!(result.iter().all(|e| e.score.is_unknown()));
}

#[test]
fn partial_transport_failure_degrades_one_candidate() {
    let oracle = ScriptedOracle::from_fn(|prompt| {
        if prompt.contains("topic_001") {
            Err("timeout".to_string())
        } else {
            Ok("Score: 6".to_string())
        }
    });
    let rescorer = Rescorer::new(Arc::new(oracle), &config(2)).unwrap();
    let result = rescorer
        .rescore("q", &candidates(3), &topic_documents(3))
        .unwrap();
    assert_eq!(rows(&result), vec![0, 2, 1]);
    assert_eq!(result.unknown_count, 1);
    assert_eq!(result.entries[2].score, RelevanceScore::Unknown);
}

#[test]
fn rows_without_text_are_unknown_and_not_sent() {
    let oracle = Arc::new(ScriptedOracle::constant("8"));
    let rescorer = Rescorer::new(oracle.clone(), &config(2)).unwrap();
    let mut docs = HashMap::new();
    docs.insert(0usize, "first".to_string());
    docs.insert(2usize, "third".to_string());

    let result = rescorer.rescore("q", &candidates(3), &docs).unwrap();
    assert_eq!(rows(&result), vec![0, 2, 1]);
    assert_eq!(result.unknown_count, 1);
    assert_eq!(oracle.calls(), 2);
}

#[test]
fn worker_count_does_not_change_the_ranking() {
    let script = |prompt: &str| -> Result<String, String> {
        // Score depends only on the document text.
        let len = prompt.len() as u32;
        Ok(format!("{}", len % 7))
    };
    let docs: Vec<String> = (0..20).map(|i| format!("document {}", "x".repeat(i))).collect();
    let set = candidates(20);

    let serial = Rescorer::new(Arc::new(ScriptedOracle::from_fn(script)), &config(1))
        .unwrap()
        .rescore("q", &set, &docs)
        .unwrap();
    let parallel = Rescorer::new(Arc::new(ScriptedOracle::from_fn(script)), &config(8))
        .unwrap()
        .rescore("q", &set, &docs)
        .unwrap();
    assert_eq!(serial, parallel);
    assert!(parallel.is_sorted());
}

#[test]
fn long_documents_are_truncated_in_the_prompt() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let oracle = ScriptedOracle::from_fn(move |prompt| {
        sink.lock().unwrap().push(prompt.to_string());
        Ok("5".to_string())
    });
    let cfg = RerankConfig {
        max_document_chars: 10,
        ..config(1)
    };
    let rescorer = Rescorer::new(Arc::new(oracle), &cfg).unwrap();
    let docs = vec!["é".repeat(50)];
    rescorer
        .rescore("q", &CandidateSet::from_hits(vec![(0, 0.0)], 1), &docs)
        .unwrap();

    let prompts = seen.lock().unwrap();
    assert_eq!(
        prompts[0],
        format!("Query: q\nDocument: {}\nRelevance (1-10):", "é".repeat(10))
    );
}

#[test]
fn one_non_numeric_response_leaves_the_other_scores_intact() {
    let oracle = ScriptedOracle::from_fn(|prompt| {
        let score = match prompt {
            p if p.contains("topic_000") => "Score: 5",
            p if p.contains("topic_001") => "Score: 7",
            p if p.contains("topic_002") => "no idea",
            p if p.contains("topic_003") => "Score: 7",
            _ => "Score: 9",
        };
        Ok(score.to_string())
    });
    let rescorer = Rescorer::new(Arc::new(oracle), &config(3)).unwrap();
    let result = rescorer
        .rescore("q", &candidates(5), &topic_documents(5))
        .unwrap();

    assert_eq!(result.unknown_count, 1);
    assert_eq!(rows(&result), vec![4, 1, 3, 0, 2]);
    let scores: Vec<RelevanceScore> = result.iter().map(|e| e.score).collect();
    assert_eq!(
        scores,
        vec![
            RelevanceScore::Rated(9),
            RelevanceScore::Rated(7),
            RelevanceScore::Rated(7),
            RelevanceScore::Rated(5),
            RelevanceScore::Unknown,
        ]
    );
    assert_eq!(result.entries[4].original_rank, 2);
}
