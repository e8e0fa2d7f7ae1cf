//! Chat-completion access
//!
//! The orchestrator only sees the [`Completer`] capability; [`LlmService`] is the
//! HTTP implementation for OpenAI-compatible providers.

pub mod client;
pub mod prompts;
pub mod types;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use client::LlmService;
pub use prompts::ChatPrompts;
pub use prompts::PromptTemplate;
pub use types::CompletionSettings;
pub use types::PromptMessage;

use crate::errors::Result;

/// Produces a single assistant completion for a message history
#[async_trait]
pub trait Completer: Send + Sync {
    /// Return the completion text; empty output is an error
    async fn complete(
        &self,
        messages: &[PromptMessage],
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> Result<String>;
}
