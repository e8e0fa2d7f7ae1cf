//! REST client for the hosted search index

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::query::documents_from_hits;
use super::query::images_from_hits;
use super::query::SearchRequestBody;
use super::query::SearchResponse;
use crate::cancellation::run_cancellable;
use crate::config::SearchConfig;
use crate::errors::RagChatError;
use crate::errors::Result;
use crate::models::RequestOverrides;
use crate::models::SupportingContentRecord;
use crate::models::SupportingImageRecord;
use crate::rag::Retriever;

/// Search client bound to a document index and, optionally, an image index
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    index: String,
    image_index: Option<String>,
    semantic_configuration: String,
    vector_field: String,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            index: config.index.clone(),
            image_index: config.image_index.clone(),
            semantic_configuration: config.semantic_configuration.clone(),
            vector_field: config.vector_field.clone(),
        })
    }

    fn search_url(&self, index: &str) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, index, self.api_version
        )
    }

    async fn search(&self, index: &str, body: &SearchRequestBody) -> Result<SearchResponse> {
        let url = self.search_url(index);
        debug!(
            "Searching index {} (top {}, text: {}, vectors: {})",
            index,
            body.top,
            body.search.is_some(),
            body.vector_queries.len()
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagChatError::SearchError(format!(
                "Search API error ({status}): {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RagChatError::SearchError(format!("Failed to parse response: {e}")))
    }

    async fn documents(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
    ) -> Result<Vec<SupportingContentRecord>> {
        let body = SearchRequestBody::for_documents(
            query,
            embedding,
            overrides,
            &self.semantic_configuration,
            &self.vector_field,
        );
        let use_captions = body.captions.is_some();
        let response = self.search(&self.index, &body).await?;
        Ok(documents_from_hits(&response.value, use_captions))
    }

    async fn images(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
    ) -> Result<Vec<SupportingImageRecord>> {
        let Some(index) = self.image_index.as_deref() else {
            return Err(RagChatError::ConfigError(
                "image search requested but no image index is configured".to_string(),
            ));
        };
        let body = SearchRequestBody::for_images(query, embedding, overrides, &self.vector_field);
        let response = self.search(index, &body).await?;
        Ok(images_from_hits(&response.value))
    }
}

#[async_trait]
impl Retriever for SearchClient {
    async fn query_documents(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        cancel: &CancellationToken,
    ) -> Result<Vec<SupportingContentRecord>> {
        run_cancellable(cancel, self.documents(query, embedding, overrides)).await
    }

    async fn query_images(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        cancel: &CancellationToken,
    ) -> Result<Vec<SupportingImageRecord>> {
        run_cancellable(cancel, self.images(query, embedding, overrides)).await
    }
}
