use serde::{Deserialize, Serialize};

/// One search hit: an opaque row id and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub row_id: usize,
    pub distance: f32,
    /// 0-based position in the ascending-distance ordering.
    pub rank: usize,
}

/// Result of a top-k search, best match first.
///
/// Invariant: sorted by ascending distance, ties broken by ascending row id,
/// and `rank` equals the position of each entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Build from unordered `(row_id, distance)` hits, keeping at most `top_k`.
    pub fn from_hits(mut hits: Vec<(usize, f32)>, top_k: usize) -> Self {
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(top_k);
        let candidates = hits
            .into_iter()
            .enumerate()
            .map(|(rank, (row_id, distance))| Candidate {
                row_id,
                distance,
                rank,
            })
            .collect();
        Self { candidates }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn get(&self, rank: usize) -> Option<&Candidate> {
        self.candidates.get(rank)
    }

    pub fn row_ids(&self) -> Vec<usize> {
        self.candidates.iter().map(|c| c.row_id).collect()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hits_sorts_ascending_and_assigns_ranks() {
        let set = CandidateSet::from_hits(vec![(4, 0.9), (1, 0.1), (7, 0.5)], 10);
        assert_eq!(set.row_ids(), vec![1, 7, 4]);
        for (i, c) in set.iter().enumerate() {
            assert_eq!(c.rank, i);
        }
    }

    #[test]
    fn duplicate_distances_break_ties_by_row_id() {
        let set = CandidateSet::from_hits(vec![(9, 0.3), (2, 0.3), (5, 0.3)], 10);
        assert_eq!(set.row_ids(), vec![2, 5, 9]);
    }

    #[test]
    fn truncates_to_top_k() {
        let set = CandidateSet::from_hits(vec![(0, 3.0), (1, 2.0), (2, 1.0)], 2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.row_ids(), vec![2, 1]);
    }
}
