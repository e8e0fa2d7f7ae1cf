use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagChatError {
    #[error("No user question found in chat history")]
    NoUserQuestion,

    #[error("Completion returned no content ({0})")]
    EmptyCompletion(String),

    #[error("Malformed completion output: {0}")]
    MalformedCompletion(String),

    #[error("Completion output is missing required field: {0}")]
    MissingField(String),

    #[error("Failed to acquire access token: {0}")]
    TokenAcquisition(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagChatError {
    /// Whether the failure was caused by the caller rather than a collaborator
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::NoUserQuestion)
    }
}

impl From<reqwest::Error> for RagChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RagChatError>;
