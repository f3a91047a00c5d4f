//! Compiled default values for every config section.

// Embedding
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "tfidf";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.mistral.ai/v1/embeddings";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// Index
pub const DEFAULT_TARGET_DIMENSION: usize = 128;
pub const DEFAULT_NPROBE: usize = 1;
pub const DEFAULT_KMEANS_MAX_ITERATIONS: usize = 25;
pub const DEFAULT_KMEANS_TOLERANCE: f32 = 1e-4;
pub const DEFAULT_PCA_MAX_ITERATIONS: usize = 200;
pub const DEFAULT_PCA_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_SEED: u64 = 42;

// Rerank
pub const DEFAULT_RERANK_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "RAGRANK_API_KEY";
pub const DEFAULT_RESCORE_WORKERS: usize = 4;
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 4_000;

// Pipeline
pub const DEFAULT_ARTIFACT_DIR: &str = "ragrank-index";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_INDEX_CACHE_SIZE: u64 = 8;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
