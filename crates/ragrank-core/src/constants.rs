/// ragrank version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format version written into every artifact manifest.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// File names of the artifact set persisted per logical index.
pub const INDEX_FILE: &str = "index.json";
pub const PROJECTION_FILE: &str = "projection.json";
pub const DOCUMENTS_FILE: &str = "documents.json";

/// Prompt template used to ask the relevance oracle for a rating.
/// `{query}` and `{document}` are substituted verbatim.
pub const RELEVANCE_PROMPT_TEMPLATE: &str = "Query: {query}\nDocument: {document}\nRelevance (1-10):";

/// Header keywords used by the default text-column selector.
pub const TEXT_COLUMN_KEYWORDS: &[&str] = &["summary", "plot", "description", "text", "content"];

/// Target vectors per inverted list when picking a default cluster count.
pub const VECTORS_PER_CLUSTER: usize = 39;

/// Upper bound for the default cluster count.
pub const MAX_DEFAULT_CLUSTERS: usize = 100;
