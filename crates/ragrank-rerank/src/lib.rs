//! # ragrank-rerank
//!
//! Asks a language model to rate each retrieved candidate and fuses the
//! ratings into the final ranking.

pub mod fusion;
pub mod lookup;
pub mod oracle;
pub mod prompt;
pub mod rescorer;
pub mod score_parser;

pub use lookup::DocumentLookup;
pub use oracle::HttpChatOracle;
pub use rescorer::Rescorer;
