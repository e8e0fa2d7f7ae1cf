//! Embeddings generation module
//!
//! This module provides the vectorizers used for retrieval:
//! - Text embeddings for document search ([`EmbeddingClient`]: OpenAI, Azure OpenAI, Ollama)
//! - Multimodal text vectors for image search ([`VisionClient`]: Azure Computer Vision)
//!
//! # Examples
//!
//! ```rust,no_run
//! use docchat::config::AppConfig;
//! use docchat::embeddings::EmbeddingClient;
//! use docchat::embeddings::EmbeddingConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_config(&EmbeddingConfig::from_app_config(&config)?)?;
//!
//!     let embedding = client.generate("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod vision;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use vision::ImageVectorizer;
pub use vision::VisionClient;

use crate::errors::Result;

/// Default embedding dimension for OpenAI text-embedding-ada-002
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Turns text into a dense vector for document search
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn generate_embedding(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<f32>>;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let section = &config.embeddings;
        let provider =
            EmbeddingProvider::from_name(&section.provider, section.api_version.as_deref())?;

        Ok(Self {
            provider,
            model: config.embedding_model().to_string(),
            dimension: config.embedding_dimension(),
            endpoint: section.endpoint.clone(),
            api_key: section.api_key.clone(),
        })
    }
}
