//! Hosted search index access
//!
//! [`SearchClient`] implements [`crate::rag::Retriever`] over the index REST API.

pub mod client;
pub mod query;

pub use client::SearchClient;
pub use query::build_exclude_filter;
pub use query::SearchRequestBody;
