use ragrank_core::config::*;
use ragrank_core::models::Metric;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = RagConfig::from_toml("").unwrap();

    // Embedding defaults
    assert_eq!(config.embedding.provider, "tfidf");
    assert_eq!(config.embedding.dimensions, 384);
    assert_eq!(config.embedding.batch_size, 64);

    // Index defaults
    assert_eq!(config.index.target_dimension, 128);
    assert_eq!(config.index.n_clusters, None);
    assert_eq!(config.index.nprobe, 1);
    assert_eq!(config.index.metric, Metric::L2);
    assert_eq!(config.index.seed, 42);

    // Rerank defaults
    assert!(config.rerank.enabled);
    assert_eq!(config.rerank.model, "mistral-large-latest");
    assert_eq!(config.rerank.workers, 4);
    assert!(config.rerank.fallback_to_distance);

    // Pipeline defaults
    assert_eq!(config.pipeline.artifact_dir, "ragrank-index");
    assert_eq!(config.pipeline.default_top_k, 3);
    assert!(config.pipeline.text_column.is_none());

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[index]
target_dimension = 32
n_clusters = 10
metric = "inner_product"

[pipeline]
text_column = "Plot"
"#;
    let config = RagConfig::from_toml(toml).unwrap();
    assert_eq!(config.index.target_dimension, 32);
    assert_eq!(config.index.n_clusters, Some(10));
    assert_eq!(config.index.metric, Metric::InnerProduct);
    assert_eq!(config.pipeline.text_column.as_deref(), Some("Plot"));
    // Non-overridden fields keep defaults
    assert_eq!(config.index.nprobe, 1);
    assert_eq!(config.rerank.workers, 4);
}

#[test]
fn config_rejects_malformed_toml() {
    let err = RagConfig::from_toml("[index\ntarget_dimension = ").unwrap_err();
    assert!(matches!(err, ragrank_core::errors::ConfigError::ParseError { .. }));
}

#[test]
fn config_serde_roundtrip() {
    let config = RagConfig::default();
    let toml_str = config.to_toml().unwrap();
    let roundtripped = RagConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped, config);
}

#[test]
fn validate_rejects_zero_clusters_and_unknown_provider() {
    let mut config = RagConfig::default();
    config.index.n_clusters = Some(0);
    assert!(config.validate().is_err());

    let mut config = RagConfig::default();
    config.embedding.provider = "word2vec".into();
    assert!(config.validate().is_err());
}

#[test]
fn load_applies_file_then_cli() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ragrank.toml");
    std::fs::write(&path, "[index]\ntarget_dimension = 64\nnprobe = 2\n").unwrap();

    let cli = CliOverrides {
        nprobe: Some(5),
        artifact_dir: Some("/tmp/idx".into()),
        ..Default::default()
    };
    let config = RagConfig::load(Some(&path), Some(&cli)).unwrap();
    assert_eq!(config.index.target_dimension, 64);
    assert_eq!(config.index.nprobe, 5);
    assert_eq!(config.pipeline.artifact_dir, "/tmp/idx");
}

#[test]
fn load_without_file_uses_defaults() {
    let config = RagConfig::load(None, None).unwrap();
    assert_eq!(config.index.kmeans_max_iterations, 25);
}

#[test]
fn default_cluster_count_scales_with_corpus() {
    assert_eq!(index_config::default_n_clusters(0), 1);
    assert_eq!(index_config::default_n_clusters(200), 5);
    assert_eq!(index_config::default_n_clusters(1_000_000), 100);

    let config = IndexConfig {
        n_clusters: Some(7),
        ..Default::default()
    };
    assert_eq!(config.effective_n_clusters(10_000), 7);
}

#[test]
fn model_key_distinguishes_providers() {
    let tfidf = EmbeddingConfig::default();
    let remote = EmbeddingConfig {
        provider: "remote".into(),
        ..Default::default()
    };
    assert_ne!(tfidf.model_key(), remote.model_key());
}
