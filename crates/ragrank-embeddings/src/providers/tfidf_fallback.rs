//! Hashed TF-IDF provider.
//!
//! Terms are hashed into a fixed number of signed buckets and weighted by
//! sublinear term frequency and a length-based IDF proxy. No model files and
//! no network, so it is always available and fully deterministic.

use std::collections::BTreeMap;

use ragrank_core::errors::RagResult;
use ragrank_core::traits::IEmbeddingProvider;

use crate::vector_ops::l2_normalize;

/// TF-IDF fallback embedding provider.
pub struct TfIdfFallback {
    dimensions: usize,
}

impl TfIdfFallback {
    pub const NAME: &'static str = "tfidf-fallback";

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// FNV-1a over the term bytes.
    fn fnv1a(term: &str) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    /// Lowercase alphanumeric terms of at least two characters.
    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(|s| s.to_lowercase())
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for term in Self::tokenize(text) {
            *counts.entry(term).or_default() += 1;
        }

        let mut vec = vec![0.0f32; self.dimensions];
        for (term, count) in &counts {
            let tf = 1.0 + (*count as f32).ln();
            // Longer terms are rarer; short ones behave like stopwords.
            let idf = 1.0 + (term.chars().count() as f32).ln();
            let h = Self::fnv1a(term);
            let bucket = (h % self.dimensions as u64) as usize;
            // Top bit picks the sign so colliding terms tend to cancel, not pile up.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign * tf * idf;
        }

        l2_normalize(&mut vec);
        vec
    }
}

impl IEmbeddingProvider for TfIdfFallback {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_ops::dot;

    #[test]
    fn empty_text_returns_zero_vector() {
        let p = TfIdfFallback::new(128);
        let v = p.embed("").unwrap();
        assert_eq!(v.len(), 128);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn output_is_normalized() {
        let p = TfIdfFallback::new(256);
        let v = p.embed("rust programming language systems").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[test]
    fn deterministic_and_batch_consistent() {
        let p = TfIdfFallback::new(128);
        let texts = vec!["hello world".to_string(), "foo bar baz".to_string()];
        let batch = p.embed_batch(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], p.embed(text).unwrap());
        }
    }

    #[test]
    fn similar_texts_have_higher_cosine() {
        let p = TfIdfFallback::new(256);
        let a = p.embed("volcano eruption lava flow").unwrap();
        let b = p.embed("volcano eruption ash cloud").unwrap();
        let c = p.embed("pasta recipe with tomato").unwrap();
        assert!(dot(&a, &b) > dot(&a, &c));
    }
}
