//! Property tests for score parsing and rank fusion.

use proptest::prelude::*;

use ragrank_core::models::{RelevanceScore, RescoredCandidate, RescoredSet};
use ragrank_rerank::fusion::fuse;
use ragrank_rerank::prompt::relevance_prompt;
use ragrank_rerank::score_parser::parse_score;

fn score_strategy() -> impl Strategy<Value = RelevanceScore> {
    prop_oneof![
        (0u32..=10).prop_map(RelevanceScore::Rated),
        Just(RelevanceScore::Unknown),
    ]
}

proptest! {
    #[test]
    fn fused_output_is_a_sorted_permutation(scores in prop::collection::vec(score_strategy(), 0..40)) {
        let entries: Vec<RescoredCandidate> = scores
            .iter()
            .enumerate()
            .map(|(rank, &score)| RescoredCandidate {
                row_id: 1000 + rank,
                score,
                distance: rank as f32,
                original_rank: rank,
            })
            .collect();

        let fused = fuse(entries.clone());
        prop_assert_eq!(fused.len(), entries.len());

        let mut rows: Vec<usize> = fused.iter().map(|e| e.row_id).collect();
        rows.sort_unstable();
        let expected: Vec<usize> = entries.iter().map(|e| e.row_id).collect();
        prop_assert_eq!(rows, expected);

        let set = RescoredSet { entries: fused, unknown_count: 0 };
        prop_assert!(set.is_sorted());
    }

    #[test]
    fn all_unknown_keeps_distance_order(n in 0usize..30) {
        let entries: Vec<RescoredCandidate> = (0..n)
            .map(|rank| RescoredCandidate {
                row_id: n - rank,
                score: RelevanceScore::Unknown,
                distance: rank as f32,
                original_rank: rank,
            })
            .collect();
        prop_assert_eq!(fuse(entries.clone()), entries);
    }

    #[test]
    fn leading_integer_is_parsed(value in 0u32..1_000_000, prefix in "[a-zA-Z :]{0,12}", suffix in "[a-zA-Z .]{0,12}") {
        let response = format!("{prefix}{value}{suffix}");
        prop_assert_eq!(parse_score(&response), Some(value));
    }

    #[test]
    fn digitless_responses_are_unknown(response in "[^0-9]{0,40}") {
        prop_assert_eq!(parse_score(&response), None);
    }

    #[test]
    fn prompt_never_panics_and_bounds_document(query in ".{0,30}", document in ".{0,200}", max in 0usize..64) {
        let prompt = relevance_prompt(&query, &document, max);
        let kept: String = document.chars().take(max).collect();
        let expected_document = format!("\nDocument: {kept}\nRelevance (1-10):");
        prop_assert!(prompt.ends_with(&expected_document));
    }
}
