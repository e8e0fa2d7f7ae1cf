use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "DOCCHAT_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Set for Azure OpenAI deployments, which route by deployment and api-version
    #[serde(default)]
    pub api_version: Option<String>,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    /// "openai", "azure" or "ollama"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_version: Option<String>,
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub index: String,
    /// Index holding image records; image retrieval is off when unset
    #[serde(default)]
    pub image_index: Option<String>,
    #[serde(default = "default_search_api_version")]
    pub api_version: String,
    #[serde(default = "default_semantic_configuration")]
    pub semantic_configuration: String,
    #[serde(default = "default_vector_field")]
    pub vector_field: String,
}

fn default_search_api_version() -> String {
    "2023-11-01".to_string()
}

fn default_semantic_configuration() -> String {
    "default".to_string()
}

fn default_vector_field() -> String {
    "embedding".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_vision_api_version")]
    pub api_version: String,
    #[serde(default = "default_vision_model_version")]
    pub model_version: String,
}

fn default_vision_api_version() -> String {
    "2023-02-01-preview".to_string()
}

fn default_vision_model_version() -> String {
    "latest".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub account_endpoint: String,
    pub container: String,
    /// Pre-issued access token appended to image URLs
    #[serde(default)]
    pub sas_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(default = "default_authority")]
    pub authority: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_scope")]
    pub scope: String,
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_token_scope() -> String {
    "https://storage.azure.com/.default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub vision: Option<VisionConfig>,
    #[serde(default)]
    pub credential: Option<CredentialConfig>,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::RagChatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Check that every configured service endpoint is an absolute http(s) URL
    pub fn validate(&self) -> crate::Result<()> {
        let mut endpoints = vec![
            ("llm.llm_endpoint", self.llm.llm_endpoint.as_str()),
            ("embeddings.endpoint", self.embeddings.endpoint.as_str()),
            ("search.endpoint", self.search.endpoint.as_str()),
            ("storage.account_endpoint", self.storage.account_endpoint.as_str()),
        ];
        if let Some(vision) = &self.vision {
            endpoints.push(("vision.endpoint", vision.endpoint.as_str()));
        }
        if let Some(credential) = &self.credential {
            endpoints.push(("credential.authority", credential.authority.as_str()));
        }

        for (name, value) in endpoints {
            let parsed = url::Url::parse(value).map_err(|e| {
                crate::RagChatError::ConfigError(format!("{name} is not a valid URL ({value}): {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(crate::RagChatError::ConfigError(format!(
                    "{name} must use http or https, got {}",
                    parsed.scheme()
                )));
            }
        }

        if self.search.index.trim().is_empty() {
            return Err(crate::RagChatError::ConfigError(
                "search.index must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.llm_key
    }

    /// Get LLM model (deployment name on Azure)
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Whether image retrieval is wired up
    pub fn vision_enabled(&self) -> bool {
        self.vision.is_some() && self.search.image_index.is_some()
    }

    /// Base URL that citations in answers resolve against
    pub fn citation_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.storage.account_endpoint.trim_end_matches('/'),
            self.storage.container.trim_matches('/')
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            llm: LlmConfig {
                llm_endpoint: "https://api.openai.com/v1".to_string(),
                llm_key: String::new(),
                llm_model: default_llm_model(),
                api_version: None,
            },
            embeddings: EmbeddingsConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "text-embedding-ada-002".to_string(),
                dimension: 1536,
                provider: default_embedding_provider(),
                api_version: None,
            },
            search: SearchConfig {
                endpoint: "https://your-search.search.windows.net".to_string(),
                api_key: String::new(),
                index: "gptkbindex".to_string(),
                image_index: None,
                api_version: default_search_api_version(),
                semantic_configuration: default_semantic_configuration(),
                vector_field: default_vector_field(),
            },
            storage: StorageConfig {
                account_endpoint: "https://your-account.blob.core.windows.net".to_string(),
                container: "content".to_string(),
                sas_token: None,
            },
            vision: None,
            credential: None,
            server: ServerConfig::default(),
        }
    }
}
