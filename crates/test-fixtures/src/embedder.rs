use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ragrank_core::errors::{EmbeddingError, RagResult};
use ragrank_core::traits::IEmbeddingProvider;

/// Words that carry no topic. Dropping them makes "notes on topic_007" and
/// "notes about topic_007" embed identically.
const STOPWORDS: &[&str] = &["a", "about", "an", "and", "for", "notes", "of", "on", "the", "to"];

/// Hash-seeded bag-of-words embedder.
///
/// Every token gets a fixed random vector in a small latent space, which a
/// fixed random matrix lifts into `dimensions`. The corpus therefore lies in
/// a `latent_dim` subspace, so a projection to at least that many components
/// loses nothing.
pub struct FixtureEmbedder {
    name: String,
    dimensions: usize,
    latent_dim: usize,
    lift: Vec<Vec<f32>>,
    available: bool,
}

impl FixtureEmbedder {
    pub fn new(dimensions: usize, latent_dim: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let lift = (0..latent_dim)
            .map(|_| (0..dimensions).map(|_| rng.gen_range(-1.0f32..1.0)).collect())
            .collect();
        Self {
            name: "fixture".to_string(),
            dimensions,
            latent_dim,
            lift,
            available: true,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Every call fails with `ProviderUnavailable`.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    fn token_latent(&self, token: &str) -> Vec<f32> {
        let hash = blake3::hash(token.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&hash.as_bytes()[..8]);
        let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(seed));
        (0..self.latent_dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut latent = vec![0.0f32; self.latent_dim];
        let lowered = text.to_lowercase();
        let tokens = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| !t.is_empty() && !STOPWORDS.contains(t));
        for token in tokens {
            for (l, x) in latent.iter_mut().zip(self.token_latent(token)) {
                *l += x;
            }
        }

        let mut out = vec![0.0f32; self.dimensions];
        for (weight, row) in latent.iter().zip(&self.lift) {
            for (o, r) in out.iter_mut().zip(row) {
                *o += weight * r;
            }
        }
        let norm = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut out {
                *x /= norm;
            }
        }
        out
    }
}

impl IEmbeddingProvider for FixtureEmbedder {
    fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        if !self.available {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: self.name.clone(),
            }
            .into());
        }
        Ok(self.embed_one(text))
    }

    fn embed_batch(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwords_do_not_change_the_vector() {
        let e = FixtureEmbedder::new(64, 8);
        assert_eq!(
            e.embed("Notes on topic_007").unwrap(),
            e.embed("notes about topic_007").unwrap()
        );
    }

    #[test]
    fn distinct_topics_differ() {
        let e = FixtureEmbedder::new(64, 8);
        assert_ne!(e.embed("topic_001").unwrap(), e.embed("topic_002").unwrap());
    }

    #[test]
    fn output_has_requested_dimensions_and_unit_norm() {
        let v = FixtureEmbedder::new(128, 16).embed("topic_042").unwrap();
        assert_eq!(v.len(), 128);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
