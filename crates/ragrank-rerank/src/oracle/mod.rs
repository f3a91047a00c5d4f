//! Relevance oracle implementations.

pub mod http_chat;

pub use http_chat::HttpChatOracle;
