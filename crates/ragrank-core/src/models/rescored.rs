use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Relevance assigned by the oracle.
///
/// `Unknown` marks a candidate whose response held no usable integer.
/// It orders below every rated score so it always sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceScore {
    Rated(u32),
    Unknown,
}

impl RelevanceScore {
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Rated(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl Ord for RelevanceScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Rated(a), Self::Rated(b)) => a.cmp(b),
            (Self::Rated(_), Self::Unknown) => Ordering::Greater,
            (Self::Unknown, Self::Rated(_)) => Ordering::Less,
            (Self::Unknown, Self::Unknown) => Ordering::Equal,
        }
    }
}

impl PartialOrd for RelevanceScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for RelevanceScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rated(v) => write!(f, "{v}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// A candidate after rescoring. Carries its identity and original rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescoredCandidate {
    pub row_id: usize,
    pub score: RelevanceScore,
    /// Distance from the initial search, kept for display.
    pub distance: f32,
    /// Position in the ascending-distance CandidateSet.
    pub original_rank: usize,
}

/// Final ranking: descending score, ties by ascending original rank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RescoredSet {
    pub entries: Vec<RescoredCandidate>,
    /// Candidates whose score could not be parsed.
    pub unknown_count: usize,
}

impl RescoredSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RescoredCandidate> {
        self.entries.iter()
    }

    pub fn best(&self) -> Option<&RescoredCandidate> {
        self.entries.first()
    }

    /// Whether `entries` respects the ordering invariant.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| {
            w[0].score > w[1].score
                || (w[0].score == w[1].score && w[0].original_rank < w[1].original_rank)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sorts_below_every_rating() {
        assert!(RelevanceScore::Rated(0) > RelevanceScore::Unknown);
        assert!(RelevanceScore::Rated(10) > RelevanceScore::Rated(3));
        assert_eq!(RelevanceScore::Unknown.cmp(&RelevanceScore::Unknown), Ordering::Equal);
    }

    #[test]
    fn display_formats_scores() {
        assert_eq!(RelevanceScore::Rated(7).to_string(), "7");
        assert_eq!(RelevanceScore::Unknown.to_string(), "unknown");
    }
}
