//! Build and query orchestration.
//!
//! Build: corpus → batched embeddings → PCA → IVF → artifacts on disk.
//! Query: cached artifacts → embed + project → IVF search → rescoring → documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use moka::sync::Cache;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use ragrank_core::config::RagConfig;
use ragrank_core::errors::{ArtifactError, EmbeddingError, RagError, RagResult};
use ragrank_core::models::{CandidateSet, Document, IndexId, Metric, RelevanceScore, RescoredSet};
use ragrank_core::traits::{Cancellable, CancellationToken, IAnswerGenerator, IEmbeddingProvider, IRelevanceOracle};
use ragrank_embeddings::ModelRegistry;
use ragrank_index::{persistence, IndexArtifacts, IvfIndex, PcaParams, ProjectionModel};
use ragrank_rerank::{HttpChatOracle, Rescorer};

use crate::corpus::{self, ColumnSelector, KeywordColumnSelector};
use crate::models::{QueryAnswer, RankedDocument};

/// A verified artifact set, shared read-only between queries.
#[derive(Debug)]
pub struct LoadedIndex {
    pub artifacts: IndexArtifacts,
}

impl LoadedIndex {
    pub fn documents(&self) -> &[Document] {
        &self.artifacts.documents
    }
}

/// Everything that changes the built structures, hashed into the index id.
/// Search-time settings such as `nprobe` stay out.
#[derive(Serialize)]
struct BuildKey<'a> {
    target_dimension: usize,
    n_clusters: Option<usize>,
    metric: Metric,
    kmeans_max_iterations: usize,
    kmeans_tolerance: f32,
    pca_max_iterations: usize,
    pca_tolerance: f64,
    seed: u64,
    embedder: &'a str,
    dimensions: usize,
    max_documents: Option<usize>,
}

/// Entry point for building indexes and answering queries.
pub struct Pipeline {
    config: RagConfig,
    embedder: Arc<dyn IEmbeddingProvider>,
    rescorer: Option<Rescorer>,
    selector: Box<dyn ColumnSelector>,
    indexes: Cache<IndexId, Arc<LoadedIndex>>,
}

impl Pipeline {
    /// Pipeline wired to the configured embedding engine (shared through the
    /// process-wide registry) and the HTTP chat oracle.
    pub fn new(config: RagConfig) -> RagResult<Self> {
        let embedder: Arc<dyn IEmbeddingProvider> = ModelRegistry::global().get_or_load(&config.embedding);
        let oracle: Option<Arc<dyn IRelevanceOracle>> = if config.rerank.enabled {
            Some(Arc::new(HttpChatOracle::from_config(&config.rerank)?))
        } else {
            None
        };
        Self::with_components(config, embedder, oracle)
    }

    /// Pipeline over caller-supplied collaborators. Rescoring runs only when
    /// it is enabled in config and an oracle is given.
    pub fn with_components(
        config: RagConfig,
        embedder: Arc<dyn IEmbeddingProvider>,
        oracle: Option<Arc<dyn IRelevanceOracle>>,
    ) -> RagResult<Self> {
        let rescorer = match oracle {
            Some(oracle) if config.rerank.enabled => Some(Rescorer::new(oracle, &config.rerank)?),
            _ => None,
        };
        let indexes = Cache::builder()
            .max_capacity(config.pipeline.index_cache_size)
            .build();
        info!(
            embedder = embedder.name(),
            rescoring = rescorer.is_some(),
            artifact_dir = %config.pipeline.artifact_dir,
            "pipeline ready"
        );
        Ok(Self {
            config,
            embedder,
            rescorer,
            selector: Box::new(KeywordColumnSelector),
            indexes,
        })
    }

    /// Replace the default text-column selector.
    pub fn with_column_selector(mut self, selector: Box<dyn ColumnSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn artifact_root(&self) -> PathBuf {
        PathBuf::from(&self.config.pipeline.artifact_dir)
    }

    /// Build and persist an index over a CSV corpus.
    pub fn build_index(&self, corpus_path: &Path) -> RagResult<IndexId> {
        self.build_index_cancellable(corpus_path, &CancellationToken::new())
    }

    /// Like `build_index`, checking `token` between embedding batches.
    pub fn build_index_cancellable(&self, corpus_path: &Path, token: &dyn Cancellable) -> RagResult<IndexId> {
        let documents = corpus::load_corpus(corpus_path, &self.config.pipeline, self.selector.as_ref())?;
        self.build(documents, token)
    }

    /// Build and persist an index over an in-memory corpus. Documents
    /// without text are dropped and row ids renumbered.
    pub fn build_index_from_documents(&self, documents: Vec<Document>, token: &dyn Cancellable) -> RagResult<IndexId> {
        let documents = corpus::normalize_documents(documents, self.config.pipeline.max_documents)?;
        self.build(documents, token)
    }

    fn build(&self, documents: Vec<Document>, token: &dyn Cancellable) -> RagResult<IndexId> {
        let _span = info_span!("build_index", documents = documents.len()).entered();
        let index_config = &self.config.index;

        let index_id = IndexId::derive(documents.iter().map(|d| d.text.as_str()), &self.build_key()?);
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let (embeddings, embedder) = self.embed_corpus(&texts, token)?;

        let projection = ProjectionModel::fit(&embeddings, index_config.target_dimension, &PcaParams::from(index_config))?;
        let projected = projection.apply(&embeddings)?;
        let n_clusters = index_config.effective_n_clusters(projected.len());
        let index = IvfIndex::build(&projected, n_clusters, index_config)?;

        if token.is_cancelled() {
            return Err(RagError::Cancelled);
        }

        let artifacts = IndexArtifacts::new(index_id.clone(), index, projection, documents, embedder)?;
        persistence::save(&self.artifact_root(), &artifacts)?;
        self.indexes.invalidate(&index_id);

        info!(
            index_id = %index_id,
            documents = artifacts.documents.len(),
            input_dim = artifacts.manifest.input_dim,
            output_dim = artifacts.manifest.output_dim,
            n_clusters,
            embedder = %artifacts.manifest.embedder,
            "index built"
        );
        Ok(index_id)
    }

    /// Embed in batches, checking for cancellation before each one. All
    /// batches must come from the same provider.
    fn embed_corpus(&self, texts: &[String], token: &dyn Cancellable) -> RagResult<(Vec<Vec<f32>>, String)> {
        let batch_size = self.config.embedding.batch_size.max(1);
        let mut embeddings = Vec::with_capacity(texts.len());
        let mut source: Option<String> = None;

        for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
            if token.is_cancelled() {
                info!(batch = batch_no, "build cancelled");
                return Err(RagError::Cancelled);
            }
            let (vectors, batch_source) = self.embedder.embed_batch_with_source(batch)?;
            match &source {
                Some(first) if *first != batch_source => {
                    return Err(EmbeddingError::InferenceFailed {
                        reason: format!(
                            "embedding provider changed mid-build from {first} to {batch_source}"
                        ),
                    }
                    .into());
                }
                Some(_) => {}
                None => source = Some(batch_source),
            }
            embeddings.extend(vectors);
            debug!(batch = batch_no, embedded = embeddings.len(), total = texts.len(), "batch embedded");
        }

        let source = source.ok_or(EmbeddingError::InferenceFailed {
            reason: "nothing to embed".to_string(),
        })?;
        Ok((embeddings, source))
    }

    fn build_key(&self) -> RagResult<String> {
        let index = &self.config.index;
        let key = BuildKey {
            target_dimension: index.target_dimension,
            n_clusters: index.n_clusters,
            metric: index.metric,
            kmeans_max_iterations: index.kmeans_max_iterations,
            kmeans_tolerance: index.kmeans_tolerance,
            pca_max_iterations: index.pca_max_iterations,
            pca_tolerance: index.pca_tolerance,
            seed: index.seed,
            embedder: self.embedder.name(),
            dimensions: self.embedder.dimensions(),
            max_documents: self.config.pipeline.max_documents,
        };
        serde_json::to_string(&key).map_err(|e| {
            ArtifactError::Serialization {
                path: "<build config>".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Load (or reuse) the artifact set for `index_id`.
    pub fn load_index(&self, index_id: &IndexId) -> RagResult<Arc<LoadedIndex>> {
        if let Some(loaded) = self.indexes.get(index_id) {
            return Ok(loaded);
        }
        let artifacts = persistence::load(&self.artifact_root(), index_id)?;
        let loaded = Arc::new(LoadedIndex { artifacts });
        self.indexes.insert(index_id.clone(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Retrieve and rank the `top_k` documents most relevant to `query`.
    ///
    /// # Errors
    /// - `NotFound` / `IndexArtifactMismatch` for a missing or inconsistent index,
    ///   including an index built with a different embedder.
    /// - `RescoringUnavailable` when the oracle cannot be reached and
    ///   `rerank.fallback_to_distance` is off.
    pub fn answer_query(&self, query: &str, index_id: &IndexId, top_k: usize) -> RagResult<QueryAnswer> {
        let _span = info_span!("answer_query", index_id = %index_id, top_k).entered();
        let loaded = self.load_index(index_id)?;
        let manifest = &loaded.artifacts.manifest;

        let (mut vectors, source) = self.embedder.embed_batch_with_source(&[query.to_string()])?;
        if source != manifest.embedder {
            return Err(ArtifactError::IndexArtifactMismatch {
                index_id: index_id.to_string(),
                details: format!(
                    "index was embedded with {} but the query was embedded with {source}",
                    manifest.embedder
                ),
            }
            .into());
        }
        let vector = vectors.pop().ok_or(EmbeddingError::InferenceFailed {
            reason: "provider returned no vector".to_string(),
        })?;

        let projected = loaded.artifacts.projection.apply_one(&vector)?;
        let candidates = loaded
            .artifacts
            .index
            .search_with_nprobe(&projected, top_k, self.config.index.nprobe)?;
        debug!(candidates = candidates.len(), "vector search done");

        let answer = match &self.rescorer {
            None => distance_answer(index_id, query, &candidates, loaded.documents())?,
            Some(rescorer) => match rescorer.rescore(query, &candidates, loaded.documents()) {
                Ok(rescored) => rescored_answer(index_id, query, &rescored, loaded.documents())?,
                Err(e) if e.is_rescoring_unavailable() && self.config.rerank.fallback_to_distance => {
                    warn!(error = %e, "rescoring unavailable, returning distance ranking");
                    distance_answer(index_id, query, &candidates, loaded.documents())?
                }
                Err(e) => return Err(e),
            },
        };

        info!(
            results = answer.results.len(),
            rescored = answer.rescored,
            unknown = answer.unknown_scores,
            best = ?answer.best().map(|b| b.row_id),
            "query answered"
        );
        Ok(answer)
    }

    /// Retrieve context for `query` and hand it to `generator`.
    pub fn answer_with_generator(
        &self,
        query: &str,
        index_id: &IndexId,
        top_k: usize,
        history: &[String],
        generator: &dyn IAnswerGenerator,
    ) -> RagResult<(QueryAnswer, String)> {
        let answer = self.answer_query(query, index_id, top_k)?;
        let prompt = generation_prompt(query, &answer);
        let reply = generator.generate(&prompt, history)?;
        Ok((answer, reply))
    }

    /// Drop every cached artifact set.
    pub fn clear_cache(&self) {
        self.indexes.invalidate_all();
    }
}

/// Prompt handed to the answer generator: the question followed by the
/// ranked documents, one per line.
pub fn generation_prompt(query: &str, answer: &QueryAnswer) -> String {
    let docs: Vec<String> = answer.results.iter().map(RankedDocument::display).collect();
    format!(
        "Question : {query}\n\nHere are some documents to answer the question :\n\n{}",
        docs.join("\n")
    )
}

fn distance_answer(index_id: &IndexId, query: &str, candidates: &CandidateSet, documents: &[Document]) -> RagResult<QueryAnswer> {
    let results = candidates
        .iter()
        .map(|c| ranked(index_id, documents, c.row_id, None, c.distance))
        .collect::<RagResult<Vec<_>>>()?;
    Ok(QueryAnswer {
        index_id: index_id.clone(),
        query: query.to_string(),
        results,
        unknown_scores: 0,
        rescored: false,
    })
}

fn rescored_answer(index_id: &IndexId, query: &str, rescored: &RescoredSet, documents: &[Document]) -> RagResult<QueryAnswer> {
    let results = rescored
        .iter()
        .map(|e| ranked(index_id, documents, e.row_id, Some(e.score), e.distance))
        .collect::<RagResult<Vec<_>>>()?;
    Ok(QueryAnswer {
        index_id: index_id.clone(),
        query: query.to_string(),
        results,
        unknown_scores: rescored.unknown_count,
        rescored: true,
    })
}

fn ranked(
    index_id: &IndexId,
    documents: &[Document],
    row_id: usize,
    score: Option<RelevanceScore>,
    distance: f32,
) -> RagResult<RankedDocument> {
    let doc = documents.get(row_id).ok_or_else(|| ArtifactError::IndexArtifactMismatch {
        index_id: index_id.to_string(),
        details: format!("index returned row {row_id} with no matching document"),
    })?;
    Ok(RankedDocument {
        row_id,
        text: doc.text.clone(),
        metadata: doc.metadata.clone(),
        score,
        distance,
    })
}
