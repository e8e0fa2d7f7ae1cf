//! Request and response types shared by the chat service, the HTTP API and the CLI
//!
//! Field names serialize in camelCase so the JSON matches what existing chat
//! front-ends send and expect.

use serde::Deserialize;
use serde::Serialize;

/// Number of documents retrieved when the caller does not say otherwise
pub const DEFAULT_TOP: usize = 3;

/// Sampling temperature used when the caller does not say otherwise
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Which signal drives document search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalMode {
    #[serde(alias = "text")]
    Text,
    #[serde(alias = "vector")]
    Vector,
    #[default]
    #[serde(alias = "hybrid")]
    Hybrid,
}

impl RetrievalMode {
    /// Vector and hybrid retrieval need an embedding of the question
    #[must_use]
    pub const fn uses_embedding(self) -> bool {
        matches!(self, Self::Vector | Self::Hybrid)
    }

    /// Every mode except pure vector search sends a text query
    #[must_use]
    pub const fn uses_text_query(self) -> bool {
        !matches!(self, Self::Vector)
    }
}

impl std::str::FromStr for RetrievalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "vector" => Ok(Self::Vector),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown retrieval mode: {other}")),
        }
    }
}

/// Per-request knobs; every field is optional and defaulted at call time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOverrides {
    #[serde(default)]
    pub top: Option<usize>,
    #[serde(default)]
    pub retrieval_mode: Option<RetrievalMode>,
    #[serde(default)]
    pub semantic_captions: Option<bool>,
    #[serde(default)]
    pub semantic_ranker: Option<bool>,
    #[serde(default)]
    pub exclude_category: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub suggest_followup_questions: Option<bool>,
}

impl RequestOverrides {
    #[must_use]
    pub fn top(&self) -> usize {
        self.top.unwrap_or(DEFAULT_TOP)
    }

    #[must_use]
    pub fn retrieval_mode(&self) -> RetrievalMode {
        self.retrieval_mode.unwrap_or_default()
    }

    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    #[must_use]
    pub fn semantic_captions(&self) -> bool {
        self.semantic_captions.unwrap_or(false)
    }

    #[must_use]
    pub fn semantic_ranker(&self) -> bool {
        self.semantic_ranker.unwrap_or(false)
    }

    #[must_use]
    pub fn suggest_followup_questions(&self) -> bool {
        self.suggest_followup_questions.unwrap_or(false)
    }

    /// Category to exclude, ignoring blank values
    #[must_use]
    pub fn exclude_category(&self) -> Option<&str> {
        self.exclude_category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub overrides: Option<RequestOverrides>,
}

impl ChatRequest {
    /// Content of the most recent user-authored message
    #[must_use]
    pub fn last_user_question(&self) -> Option<&str> {
        last_user_question(&self.messages)
    }
}

/// Content of the most recent user-authored message in `history`
#[must_use]
pub fn last_user_question(history: &[ChatMessage]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.is_user())
        .map(|m| m.content.as_str())
}

/// A retrieved text passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingContentRecord {
    pub title: String,
    pub content: String,
}

impl SupportingContentRecord {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A retrieved image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingImageRecord {
    pub title: String,
    pub url: String,
}

/// A titled piece of the model's self-reported reasoning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thoughts {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContext {
    pub data_points_content: Option<Vec<SupportingContentRecord>>,
    pub data_points_images: Option<Vec<SupportingImageRecord>>,
    pub followup_questions: Vec<String>,
    pub thoughts: Vec<Thoughts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseChoice {
    pub index: usize,
    pub message: ResponseMessage,
    pub context: ResponseContext,
    pub citation_base_url: String,
}

/// The externally visible result of one chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAppResponse {
    pub choices: Vec<ResponseChoice>,
}

impl ChatAppResponse {
    /// Answer text of the first choice
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}
