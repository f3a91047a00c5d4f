use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;

/// Logical identifier of one persisted index.
///
/// Derived from the corpus content and the build config so that building
/// the same corpus with the same config yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexId(String);

impl IndexId {
    /// Hex length of derived ids.
    pub const DERIVED_LEN: usize = 16;

    /// Derive an id from the corpus texts and a build-config fingerprint.
    pub fn derive<'a>(texts: impl IntoIterator<Item = &'a str>, config_fingerprint: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        for text in texts {
            hasher.update(&(text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        hasher.update(b"\x00config\x00");
        hasher.update(config_fingerprint.as_bytes());
        let hex = hasher.finalize().to_hex();
        Self(hex[..Self::DERIVED_LEN].to_string())
    }

    /// Accept a caller-provided id. Restricted to a path-safe alphabet.
    pub fn parse(id: &str) -> Result<Self, ArtifactError> {
        let valid = !id.is_empty()
            && id.len() <= 128
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ArtifactError::InvalidIndexId {
                index_id: id.to_string(),
            });
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IndexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
