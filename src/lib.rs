//! Retrieval-augmented chat over an enterprise document index
//!
//! [`rag::ReadRetrieveReadChatService`] answers a chat turn by rewriting the
//! question into a search query, retrieving supporting passages (and optionally
//! images), and asking a hosted chat model for a grounded JSON answer.

pub mod api;
pub mod cancellation;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod samples;
pub mod search;


pub use config::AppConfig;
pub use errors::*;
