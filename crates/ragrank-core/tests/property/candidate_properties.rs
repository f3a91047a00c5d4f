//! Ordering invariants of candidate sets.

use proptest::prelude::*;

use ragrank_core::models::{CandidateSet, IndexId};

proptest! {
    #[test]
    fn from_hits_is_sorted_ranked_and_bounded(
        distances in prop::collection::vec(0u8..20, 0..60),
        top_k in 0usize..80,
    ) {
        // Small integer distances force plenty of ties.
        let hits: Vec<(usize, f32)> = distances
            .iter()
            .enumerate()
            .rev()
            .map(|(row, &d)| (row, d as f32))
            .collect();
        let set = CandidateSet::from_hits(hits, top_k);

        prop_assert_eq!(set.len(), top_k.min(distances.len()));
        for (i, c) in set.iter().enumerate() {
            prop_assert_eq!(c.rank, i);
        }
        for pair in set.as_slice().windows(2) {
            prop_assert!(
                pair[0].distance < pair[1].distance
                    || (pair[0].distance == pair[1].distance && pair[0].row_id < pair[1].row_id)
            );
        }
    }

    #[test]
    fn derived_ids_always_parse(texts in prop::collection::vec(".{0,40}", 0..10), cfg in ".{0,20}") {
        let id = IndexId::derive(texts.iter().map(String::as_str), &cfg);
        prop_assert_eq!(IndexId::parse(id.as_str()).unwrap(), id);
    }
}
