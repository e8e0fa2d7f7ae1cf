//! Short-lived access tokens for image URLs handed to the model

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cancellation::run_cancellable;
use crate::config::CredentialConfig;
use crate::errors::RagChatError;
use crate::errors::Result;

/// Issues access tokens for a resource scope
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn get_token(&self, scope: &str, cancel: &CancellationToken) -> Result<String>;
}

/// Hands out a pre-issued token (e.g. a storage SAS token) regardless of scope
#[derive(Debug, Clone)]
pub struct StaticTokenIssuer {
    token: String,
}

impl StaticTokenIssuer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenIssuer for StaticTokenIssuer {
    async fn get_token(&self, _scope: &str, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(RagChatError::Cancelled);
        }
        let token = self.token.trim().trim_start_matches('?');
        if token.is_empty() {
            return Err(RagChatError::TokenAcquisition(
                "configured token is empty".to_string(),
            ));
        }
        Ok(token.to_string())
    }
}

/// OAuth2 client-credentials flow against an identity authority
#[derive(Clone)]
pub struct ClientCredentialsIssuer {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl ClientCredentialsIssuer {
    pub fn new(config: &CredentialConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                config.authority.trim_end_matches('/'),
                config.tenant_id
            ),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    async fn request_token(&self, scope: &str) -> Result<String> {
        debug!("Requesting access token for scope {}", scope);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RagChatError::TokenAcquisition(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagChatError::TokenAcquisition(format!(
                "authority returned {status}: {error_text}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RagChatError::TokenAcquisition(format!("invalid token response: {e}")))?;

        if let Some(expires_in) = token.expires_in {
            debug!("Access token valid for {}s", expires_in);
        }

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RagChatError::TokenAcquisition("no access_token in response".to_string()))
    }
}

#[async_trait]
impl TokenIssuer for ClientCredentialsIssuer {
    async fn get_token(&self, scope: &str, cancel: &CancellationToken) -> Result<String> {
        run_cancellable(cancel, self.request_token(scope)).await
    }
}

/// Append `token` to `url` as a query string
#[must_use]
pub fn append_token(url: &str, token: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{token}")
}
