//! Deterministic stand-ins for the external services, plus corpus builders,
//! shared by integration tests across the workspace.
//!
//! Nothing here touches the network or a model file.

mod corpus;
mod embedder;
mod oracle;

pub use corpus::{topic_documents, topic_query, topic_token, write_csv};
pub use embedder::FixtureEmbedder;
pub use oracle::ScriptedOracle;
