//! Text vectorization in the image embedding space (Azure Computer Vision)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cancellation::run_cancellable;
use crate::config::VisionConfig;
use crate::errors::RagChatError;
use crate::errors::Result;

/// Vectorizes text so it can be matched against indexed images
#[async_trait]
pub trait ImageVectorizer: Send + Sync {
    async fn vectorize_text(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<f32>>;
}

#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    model_version: String,
}

#[derive(Serialize)]
struct VectorizeTextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VectorizeResponse {
    vector: Vec<f32>,
    #[serde(default)]
    model_version: Option<String>,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            model_version: config.model_version.clone(),
        })
    }

    fn vectorize_url(&self) -> String {
        format!(
            "{}/computervision/retrieval:vectorizeText?api-version={}&modelVersion={}",
            self.endpoint, self.api_version, self.model_version
        )
    }

    async fn vectorize(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.vectorize_url();
        debug!("Calling vision vectorizeText API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&VectorizeTextRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagChatError::EmbeddingError(format!(
                "Vision API error ({status}): {error_text}"
            )));
        }

        let result: VectorizeResponse = response
            .json()
            .await
            .map_err(|e| RagChatError::EmbeddingError(format!("Failed to parse response: {e}")))?;

        if let Some(version) = &result.model_version {
            debug!("Vectorized text with vision model {}", version);
        }

        Ok(result.vector)
    }
}

#[async_trait]
impl ImageVectorizer for VisionClient {
    async fn vectorize_text(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<f32>> {
        run_cancellable(cancel, self.vectorize(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectorize_url() {
        let client = VisionClient::new(&VisionConfig {
            endpoint: "https://vision.cognitiveservices.azure.com/".to_string(),
            api_key: "k".to_string(),
            api_version: "2023-02-01-preview".to_string(),
            model_version: "latest".to_string(),
        })
        .unwrap();

        assert_eq!(
            client.vectorize_url(),
            "https://vision.cognitiveservices.azure.com/computervision/retrieval:vectorizeText?api-version=2023-02-01-preview&modelVersion=latest"
        );
    }
}
