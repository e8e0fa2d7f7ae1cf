//! Retrieval capability used by the chat pipeline

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::Result;
use crate::models::RequestOverrides;
use crate::models::SupportingContentRecord;
use crate::models::SupportingImageRecord;

/// Ranked retrieval of supporting documents and images
///
/// Either `query` or `embedding` may be absent: pure vector search has no text
/// query, pure text search has no embedding.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn query_documents(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        cancel: &CancellationToken,
    ) -> Result<Vec<SupportingContentRecord>>;

    async fn query_images(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        cancel: &CancellationToken,
    ) -> Result<Vec<SupportingImageRecord>>;
}
