//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers chat turns grounded in an enterprise document index:
//! - Query rewriting and question embedding
//! - Document (and optional image) retrieval
//! - Context assembly from retrieved passages
//! - LLM-based answer generation with optional follow-up questions
//!
//! # Examples
//!
//! ```rust,no_run
//! use docchat::config::AppConfig;
//! use docchat::models::ChatMessage;
//! use docchat::rag::ReadRetrieveReadChatService;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = ReadRetrieveReadChatService::from_config(&config)?;
//!
//!     let history = vec![ChatMessage::user("What is included in my health plan?")];
//!     let response = service.reply(&history, None, &CancellationToken::new()).await?;
//!     println!("Answer: {}", response.answer().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod context;
pub mod pipeline;
pub mod retriever;

pub use answer::GeneratedAnswer;
pub use context::ContextAssembler;
pub use context::NO_SOURCE_PLACEHOLDER;
pub use pipeline::ReadRetrieveReadChatService;
pub use retriever::Retriever;
