//! Read-retrieve-read chat pipeline: Rewrite -> Retrieve -> Answer -> Follow up

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use super::answer::append_followup_markers;
use super::answer::parse_answer;
use super::answer::parse_followup_questions;
use super::ContextAssembler;
use super::Retriever;
use crate::cancellation::run_cancellable;
use crate::config::AppConfig;
use crate::credentials::append_token;
use crate::credentials::ClientCredentialsIssuer;
use crate::credentials::StaticTokenIssuer;
use crate::credentials::TokenIssuer;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::embeddings::ImageVectorizer;
use crate::embeddings::VisionClient;
use crate::errors::RagChatError;
use crate::errors::Result;
use crate::llm::ChatPrompts;
use crate::llm::Completer;
use crate::llm::CompletionSettings;
use crate::llm::LlmService;
use crate::llm::PromptMessage;
use crate::models::last_user_question;
use crate::models::ChatAppResponse;
use crate::models::ChatMessage;
use crate::models::RequestOverrides;
use crate::models::ResponseChoice;
use crate::models::ResponseContext;
use crate::models::ResponseMessage;
use crate::models::Role;
use crate::models::SupportingImageRecord;
use crate::models::Thoughts;
use crate::search::SearchClient;

/// Token budget of every completion call
pub const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Scope requested for image access tokens when none is configured
pub const DEFAULT_TOKEN_SCOPE: &str = "https://storage.azure.com/.default";

/// Chat service that grounds answers in retrieved documents and images
///
/// Collaborators are built once and shared read-only across requests.
pub struct ReadRetrieveReadChatService {
    retriever: Arc<dyn Retriever>,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    vision: Option<Arc<dyn ImageVectorizer>>,
    token_issuer: Option<Arc<dyn TokenIssuer>>,
    token_scope: String,
    context_assembler: ContextAssembler,
    citation_base_url: String,
}

impl ReadRetrieveReadChatService {
    /// Create a text-only service from existing collaborators
    #[must_use]
    pub fn new(
        retriever: Arc<dyn Retriever>,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        citation_base_url: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            embedder,
            completer,
            vision: None,
            token_issuer: None,
            token_scope: DEFAULT_TOKEN_SCOPE.to_string(),
            context_assembler: ContextAssembler,
            citation_base_url: citation_base_url.into(),
        }
    }

    /// Enable image retrieval and multimodal answering
    #[must_use]
    pub fn with_vision(mut self, vectorizer: Arc<dyn ImageVectorizer>) -> Self {
        self.vision = Some(vectorizer);
        self
    }

    /// Set the issuer of access tokens appended to image URLs
    #[must_use]
    pub fn with_token_issuer(
        mut self,
        issuer: Arc<dyn TokenIssuer>,
        scope: impl Into<String>,
    ) -> Self {
        self.token_issuer = Some(issuer);
        self.token_scope = scope.into();
        self
    }

    /// Build every HTTP collaborator from configuration
    ///
    /// # Errors
    /// - Invalid endpoints in `config`
    /// - HTTP client build errors
    /// - Unknown embedding provider names
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let retriever = Arc::new(SearchClient::new(&config.search)?);
        let embedder = Arc::new(EmbeddingClient::from_config(
            &EmbeddingConfig::from_app_config(config)?,
        )?);
        let completer = Arc::new(LlmService::new(config)?);

        let mut service = Self::new(retriever, embedder, completer, config.citation_base_url());

        if let (true, Some(vision)) = (config.vision_enabled(), config.vision.as_ref()) {
            info!("Image retrieval enabled");
            service = service.with_vision(Arc::new(VisionClient::new(vision)?));
        }

        if let Some(credential) = &config.credential {
            service = service.with_token_issuer(
                Arc::new(ClientCredentialsIssuer::new(credential)?),
                credential.scope.clone(),
            );
        } else if let Some(token) = &config.storage.sas_token {
            service = service.with_token_issuer(
                Arc::new(StaticTokenIssuer::new(token.clone())),
                DEFAULT_TOKEN_SCOPE,
            );
        }

        Ok(service)
    }

    /// Answer the latest user question in `history`
    ///
    /// # Errors
    /// - No user message in `history` (no collaborator is called)
    /// - Collaborator failures (embedding, search, completion, token acquisition)
    /// - Completion output that is empty, not JSON, or missing `answer`/`thoughts`
    /// - Cancellation via `cancel`
    pub async fn reply(
        &self,
        history: &[ChatMessage],
        overrides: Option<&RequestOverrides>,
        cancel: &CancellationToken,
    ) -> Result<ChatAppResponse> {
        let question = last_user_question(history).ok_or(RagChatError::NoUserQuestion)?;

        let defaults = RequestOverrides::default();
        let overrides = overrides.unwrap_or(&defaults);
        let mode = overrides.retrieval_mode();
        let settings = CompletionSettings::new(MAX_COMPLETION_TOKENS, overrides.temperature());

        info!("Processing chat turn ({:?} retrieval): {}", mode, question);

        // Step 1: Embed the question
        let embedding = if mode.uses_embedding() {
            debug!("Step 1: Generating question embedding");
            Some(
                run_cancellable(cancel, self.embedder.generate_embedding(question, cancel))
                    .await?,
            )
        } else {
            None
        };

        // Step 2: Rewrite the conversation into a search query
        let query = if mode.uses_text_query() {
            debug!("Step 2: Rewriting search query");
            Some(self.rewrite_query(question, &settings, cancel).await?)
        } else {
            None
        };

        // Step 3: Retrieve documents
        debug!("Step 3: Retrieving documents");
        let documents = run_cancellable(
            cancel,
            self.retriever
                .query_documents(query.as_deref(), embedding.as_deref(), overrides, cancel),
        )
        .await?;
        debug!("{}", self.context_assembler.create_summary(&documents));
        let sources = self.context_assembler.assemble(&documents);

        // Step 4: Retrieve images
        let images = match &self.vision {
            Some(vision) => {
                debug!("Step 4: Retrieving images");
                let text = query.as_deref().unwrap_or(question);
                let vector = run_cancellable(cancel, vision.vectorize_text(text, cancel)).await?;
                let images = run_cancellable(
                    cancel,
                    self.retriever
                        .query_images(Some(text), Some(&vector), overrides, cancel),
                )
                .await?;
                debug!("Retrieved {} images", images.len());
                Some(images)
            }
            None => None,
        };

        // Step 5: Generate the answer
        debug!("Step 5: Generating answer");
        let mut messages = vec![PromptMessage::system(ChatPrompts::answer_system())];
        messages.extend(replay_history(history));
        messages.push(match images.as_deref() {
            Some(images) if !images.is_empty() => {
                self.multimodal_turn(&sources, images, cancel).await?
            }
            _ => PromptMessage::user(
                ChatPrompts::answer_with_citations().render_one("sources", &sources),
            ),
        });

        let completion =
            run_cancellable(cancel, self.completer.complete(&messages, &settings, cancel)).await?;
        let generated = parse_answer(&completion)?;
        let mut answer = generated.answer;

        // Step 6: Suggest follow-up questions
        let followup_questions = if overrides.suggest_followup_questions() {
            debug!("Step 6: Generating follow-up questions");
            let questions = self.followup_questions(&answer, &settings, cancel).await?;
            append_followup_markers(&mut answer, &questions);
            questions
        } else {
            Vec::new()
        };

        info!("Chat turn completed successfully");

        Ok(ChatAppResponse {
            choices: vec![ResponseChoice {
                index: 0,
                message: ResponseMessage {
                    role: Role::Assistant,
                    content: answer,
                },
                context: ResponseContext {
                    data_points_content: Some(documents),
                    data_points_images: images,
                    followup_questions,
                    thoughts: vec![Thoughts {
                        title: "Thoughts".to_string(),
                        description: generated.thoughts,
                    }],
                },
                citation_base_url: self.citation_base_url.clone(),
            }],
        })
    }

    async fn rewrite_query(
        &self,
        question: &str,
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let messages = vec![
            PromptMessage::system(ChatPrompts::query_rewrite_system()),
            PromptMessage::user(question),
        ];
        let query =
            run_cancellable(cancel, self.completer.complete(&messages, settings, cancel)).await?;
        let query = query.trim();
        if query.is_empty() {
            return Err(RagChatError::EmptyCompletion("query rewrite".to_string()));
        }
        debug!("Rewritten query: {}", query);
        Ok(query.to_string())
    }

    async fn multimodal_turn(
        &self,
        sources: &str,
        images: &[SupportingImageRecord],
        cancel: &CancellationToken,
    ) -> Result<PromptMessage> {
        let issuer = self.token_issuer.as_ref().ok_or_else(|| {
            RagChatError::TokenAcquisition("no token issuer configured for image access".to_string())
        })?;
        let token =
            run_cancellable(cancel, issuer.get_token(&self.token_scope, cancel)).await?;

        Ok(PromptMessage::user_with_images(
            ChatPrompts::answer_with_images().render_one("sources", sources),
            images.iter().map(|image| append_token(&image.url, &token)),
        ))
    }

    async fn followup_questions(
        &self,
        answer: &str,
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let messages = vec![
            PromptMessage::system(ChatPrompts::followup_system()),
            PromptMessage::user(ChatPrompts::followup_questions().render_one("answer", answer)),
        ];
        let completion =
            run_cancellable(cancel, self.completer.complete(&messages, settings, cancel)).await?;
        parse_followup_questions(&completion)
    }

    /// Get context assembler reference
    #[must_use]
    pub const fn context_assembler(&self) -> &ContextAssembler {
        &self.context_assembler
    }

    /// Base URL citations resolve against
    #[must_use]
    pub fn citation_base_url(&self) -> &str {
        &self.citation_base_url
    }

    /// Whether image retrieval is enabled
    #[must_use]
    pub fn vision_enabled(&self) -> bool {
        self.vision.is_some()
    }
}

/// Caller history as prompt turns; the service supplies its own system turn
fn replay_history(history: &[ChatMessage]) -> impl Iterator<Item = PromptMessage> + '_ {
    history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| PromptMessage::text(m.role, m.content.clone()))
}
