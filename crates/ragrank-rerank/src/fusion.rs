//! Rank fusion of oracle scores with the original distance order.

use ragrank_core::models::RescoredCandidate;

/// Order by descending score, ties by ascending original rank.
///
/// `Unknown` scores sort after every rated one. The sort is stable and the
/// tie-break is total, so equal scores never reorder arbitrarily.
pub fn fuse(mut entries: Vec<RescoredCandidate>) -> Vec<RescoredCandidate> {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.original_rank.cmp(&b.original_rank))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragrank_core::models::RelevanceScore;

    fn entry(row_id: usize, score: RelevanceScore, original_rank: usize) -> RescoredCandidate {
        RescoredCandidate {
            row_id,
            score,
            distance: original_rank as f32,
            original_rank,
        }
    }

    #[test]
    fn higher_scores_first_ties_by_rank() {
        let fused = fuse(vec![
            entry(10, RelevanceScore::Rated(5), 0),
            entry(11, RelevanceScore::Rated(9), 1),
            entry(12, RelevanceScore::Rated(5), 2),
            entry(13, RelevanceScore::Unknown, 3),
            entry(14, RelevanceScore::Rated(9), 4),
        ]);
        let rows: Vec<usize> = fused.iter().map(|e| e.row_id).collect();
        assert_eq!(rows, vec![11, 14, 10, 12, 13]);
    }

    #[test]
    fn unknown_sorts_after_zero() {
        let fused = fuse(vec![
            entry(1, RelevanceScore::Unknown, 0),
            entry(2, RelevanceScore::Rated(0), 1),
        ]);
        assert_eq!(fused[0].row_id, 2);
    }

    #[test]
    fn empty_is_empty() {
        assert!(fuse(Vec::new()).is_empty());
    }
}
