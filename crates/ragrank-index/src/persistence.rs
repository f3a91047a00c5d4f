//! Artifact persistence.
//!
//! One logical index lives under `<root>/<index_id>/` as three JSON files:
//! the IVF index with its manifest, the projection model, and the surviving
//! corpus rows. They are only ever loaded as a set, and any disagreement
//! between them is an `IndexArtifactMismatch`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ragrank_core::constants::{ARTIFACT_FORMAT_VERSION, DOCUMENTS_FILE, INDEX_FILE, PROJECTION_FILE};
use ragrank_core::errors::{ArtifactError, RagResult};
use ragrank_core::models::{ArtifactManifest, Document, IndexId};

use crate::ivf::IvfIndex;
use crate::projection::ProjectionModel;

/// Everything needed to answer queries against one index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArtifacts {
    pub manifest: ArtifactManifest,
    pub index: IvfIndex,
    pub projection: ProjectionModel,
    pub documents: Vec<Document>,
}

impl IndexArtifacts {
    /// Bundle freshly built parts and stamp a manifest describing them.
    pub fn new(
        index_id: IndexId,
        index: IvfIndex,
        projection: ProjectionModel,
        documents: Vec<Document>,
        embedder: impl Into<String>,
    ) -> RagResult<Self> {
        let manifest = ArtifactManifest {
            format_version: ARTIFACT_FORMAT_VERSION,
            index_id,
            created_at: Utc::now(),
            document_count: documents.len(),
            input_dim: projection.input_dim,
            output_dim: projection.output_dim,
            n_clusters: index.n_clusters(),
            metric: index.metric(),
            projection_fingerprint: projection.fingerprint()?,
            embedder: embedder.into(),
        };
        Ok(Self {
            manifest,
            index,
            projection,
            documents,
        })
    }

    pub fn index_id(&self) -> &IndexId {
        &self.manifest.index_id
    }
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    manifest: ArtifactManifest,
    index: IvfIndex,
}

#[derive(Serialize, Deserialize)]
struct ProjectionFile {
    index_id: IndexId,
    projection: ProjectionModel,
}

#[derive(Serialize, Deserialize)]
struct DocumentsFile {
    index_id: IndexId,
    documents: Vec<Document>,
}

/// Directory holding the artifacts of `id`.
pub fn artifact_dir(root: &Path, id: &IndexId) -> PathBuf {
    root.join(id.as_str())
}

/// Whether a complete artifact set for `id` exists on disk.
pub fn exists(root: &Path, id: &IndexId) -> bool {
    let dir = artifact_dir(root, id);
    [INDEX_FILE, PROJECTION_FILE, DOCUMENTS_FILE]
        .iter()
        .all(|f| dir.join(f).is_file())
}

/// Persist an artifact set, replacing any previous set with the same id.
/// Each file is written to a temporary sibling and renamed into place.
pub fn save(root: &Path, artifacts: &IndexArtifacts) -> RagResult<PathBuf> {
    let id = &artifacts.manifest.index_id;
    let dir = artifact_dir(root, id);
    fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

    write_json(
        &dir.join(PROJECTION_FILE),
        &ProjectionFile {
            index_id: id.clone(),
            projection: artifacts.projection.clone(),
        },
    )?;
    write_json(
        &dir.join(DOCUMENTS_FILE),
        &DocumentsFile {
            index_id: id.clone(),
            documents: artifacts.documents.clone(),
        },
    )?;
    // The index file carries the manifest, so it goes last.
    write_json(
        &dir.join(INDEX_FILE),
        &IndexFile {
            manifest: artifacts.manifest.clone(),
            index: artifacts.index.clone(),
        },
    )?;

    info!(index_id = %id, path = %dir.display(), "index artifacts saved");
    Ok(dir)
}

/// Load and cross-check the artifact set for `id`.
///
/// # Errors
/// - `NotFound` when the directory or any file is missing.
/// - `IndexArtifactMismatch` when the files do not belong together.
pub fn load(root: &Path, id: &IndexId) -> RagResult<IndexArtifacts> {
    let dir = artifact_dir(root, id);
    if !exists(root, id) {
        return Err(ArtifactError::NotFound {
            index_id: id.to_string(),
            path: dir.display().to_string(),
        }
        .into());
    }

    let index_file: IndexFile = read_json(&dir.join(INDEX_FILE))?;
    let projection_file: ProjectionFile = read_json(&dir.join(PROJECTION_FILE))?;
    let documents_file: DocumentsFile = read_json(&dir.join(DOCUMENTS_FILE))?;

    let artifacts = IndexArtifacts {
        manifest: index_file.manifest,
        index: index_file.index,
        projection: projection_file.projection,
        documents: documents_file.documents,
    };
    verify(
        id,
        &[&projection_file.index_id, &documents_file.index_id],
        &artifacts,
    )?;

    debug!(index_id = %id, documents = artifacts.documents.len(), "index artifacts loaded");
    Ok(artifacts)
}

fn verify(id: &IndexId, file_ids: &[&IndexId], artifacts: &IndexArtifacts) -> RagResult<()> {
    let mismatch = |details: String| -> RagResult<()> {
        Err(ArtifactError::IndexArtifactMismatch {
            index_id: id.to_string(),
            details,
        }
        .into())
    };
    let m = &artifacts.manifest;

    if m.format_version != ARTIFACT_FORMAT_VERSION {
        return mismatch(format!(
            "format version {} (expected {ARTIFACT_FORMAT_VERSION})",
            m.format_version
        ));
    }
    if &m.index_id != id {
        return mismatch(format!("index file belongs to {}", m.index_id));
    }
    if let Some(other) = file_ids.iter().find(|f| **f != id) {
        return mismatch(format!("companion file belongs to {other}"));
    }

    if let Err(e) = artifacts.projection.validate_shape() {
        return mismatch(format!("projection is malformed: {e}"));
    }
    let fingerprint = artifacts.projection.fingerprint()?;
    if fingerprint != m.projection_fingerprint {
        return mismatch("projection fingerprint differs from manifest".to_string());
    }
    if artifacts.projection.input_dim != m.input_dim || artifacts.projection.output_dim != m.output_dim {
        return mismatch(format!(
            "projection is {}→{}, manifest says {}→{}",
            artifacts.projection.input_dim, artifacts.projection.output_dim, m.input_dim, m.output_dim
        ));
    }

    if let Err(e) = artifacts.index.validate() {
        return mismatch(format!("index is malformed: {e}"));
    }
    if artifacts.index.dim() != m.output_dim {
        return mismatch(format!(
            "index dimension {} but projection outputs {}",
            artifacts.index.dim(),
            m.output_dim
        ));
    }
    if artifacts.index.n_clusters() != m.n_clusters || artifacts.index.metric() != m.metric {
        return mismatch("index layout differs from manifest".to_string());
    }

    if artifacts.index.len() != m.document_count || artifacts.documents.len() != m.document_count {
        return mismatch(format!(
            "manifest lists {} documents, index holds {}, documents file holds {}",
            m.document_count,
            artifacts.index.len(),
            artifacts.documents.len()
        ));
    }
    if let Some((pos, doc)) = artifacts
        .documents
        .iter()
        .enumerate()
        .find(|(pos, d)| d.row_id != *pos)
    {
        return mismatch(format!("document at position {pos} has row id {}", doc.row_id));
    }
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RagResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| ArtifactError::Serialization {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> RagResult<T> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ArtifactError::Serialization {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn io_error(path: &Path, e: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
