//! Recording collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use docchat::credentials::TokenIssuer;
use docchat::embeddings::Embedder;
use docchat::embeddings::ImageVectorizer;
use docchat::llm::Completer;
use docchat::llm::CompletionSettings;
use docchat::llm::PromptMessage;
use docchat::models::RequestOverrides;
use docchat::models::SupportingContentRecord;
use docchat::models::SupportingImageRecord;
use docchat::rag::ReadRetrieveReadChatService;
use docchat::rag::Retriever;
use docchat::RagChatError;
use docchat::Result;
use tokio_util::sync::CancellationToken;

pub const CITATION_BASE_URL: &str = "https://acct.blob.core.windows.net/content";

/// Ordered record of every collaborator call
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub struct RecordingEmbedder {
    pub log: CallLog,
    pub vector: Vec<f32>,
}

#[async_trait]
impl Embedder for RecordingEmbedder {
    async fn generate_embedding(&self, text: &str, _cancel: &CancellationToken) -> Result<Vec<f32>> {
        self.log.push(format!("embed:{text}"));
        Ok(self.vector.clone())
    }
}

/// Returns scripted completions in order and keeps every prompt it saw
pub struct ScriptedCompleter {
    pub log: CallLog,
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(Vec<PromptMessage>, CompletionSettings)>>,
}

impl ScriptedCompleter {
    pub fn new(log: CallLog, responses: &[&str]) -> Self {
        Self {
            log,
            responses: Mutex::new(responses.iter().map(ToString::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(Vec<PromptMessage>, CompletionSettings)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(
        &self,
        messages: &[PromptMessage],
        settings: &CompletionSettings,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        self.log.push("complete");
        self.prompts
            .lock()
            .unwrap()
            .push((messages.to_vec(), settings.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RagChatError::LlmError("no scripted completion left".to_string()))
    }
}

/// Captured arguments of one retriever call
#[derive(Debug, Clone)]
pub struct RetrieverCall {
    pub query: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub overrides: RequestOverrides,
}

pub struct RecordingRetriever {
    pub log: CallLog,
    pub documents: Vec<SupportingContentRecord>,
    pub images: Vec<SupportingImageRecord>,
    pub calls: Mutex<Vec<RetrieverCall>>,
}

impl RecordingRetriever {
    pub fn new(log: CallLog, documents: Vec<SupportingContentRecord>) -> Self {
        Self {
            log,
            documents,
            images: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RetrieverCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, query: Option<&str>, embedding: Option<&[f32]>, overrides: &RequestOverrides) {
        self.calls.lock().unwrap().push(RetrieverCall {
            query: query.map(str::to_string),
            embedding: embedding.map(<[f32]>::to_vec),
            overrides: overrides.clone(),
        });
    }
}

#[async_trait]
impl Retriever for RecordingRetriever {
    async fn query_documents(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SupportingContentRecord>> {
        self.log.push("documents");
        self.record(query, embedding, overrides);
        Ok(self.documents.clone())
    }

    async fn query_images(
        &self,
        query: Option<&str>,
        embedding: Option<&[f32]>,
        overrides: &RequestOverrides,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SupportingImageRecord>> {
        self.log.push("images");
        self.record(query, embedding, overrides);
        Ok(self.images.clone())
    }
}

/// Never answers; used to observe cancellation
pub struct HangingRetriever;

#[async_trait]
impl Retriever for HangingRetriever {
    async fn query_documents(
        &self,
        _query: Option<&str>,
        _embedding: Option<&[f32]>,
        _overrides: &RequestOverrides,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SupportingContentRecord>> {
        std::future::pending().await
    }

    async fn query_images(
        &self,
        _query: Option<&str>,
        _embedding: Option<&[f32]>,
        _overrides: &RequestOverrides,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SupportingImageRecord>> {
        std::future::pending().await
    }
}

pub struct FixedVectorizer {
    pub log: CallLog,
}

#[async_trait]
impl ImageVectorizer for FixedVectorizer {
    async fn vectorize_text(&self, text: &str, _cancel: &CancellationToken) -> Result<Vec<f32>> {
        self.log.push(format!("vectorize:{text}"));
        Ok(vec![0.5, 0.5])
    }
}

pub struct FixedIssuer {
    pub log: CallLog,
    pub token: Option<String>,
}

#[async_trait]
impl TokenIssuer for FixedIssuer {
    async fn get_token(&self, scope: &str, _cancel: &CancellationToken) -> Result<String> {
        self.log.push(format!("token:{scope}"));
        self.token
            .clone()
            .ok_or_else(|| RagChatError::TokenAcquisition("denied".to_string()))
    }
}

/// Text-only service over recording collaborators
pub struct Harness {
    pub log: CallLog,
    pub retriever: Arc<RecordingRetriever>,
    pub completer: Arc<ScriptedCompleter>,
}

impl Harness {
    pub fn new(documents: Vec<SupportingContentRecord>, completions: &[&str]) -> Self {
        let log = CallLog::default();
        Self {
            retriever: Arc::new(RecordingRetriever::new(log.clone(), documents)),
            completer: Arc::new(ScriptedCompleter::new(log.clone(), completions)),
            log,
        }
    }

    pub fn service(&self) -> ReadRetrieveReadChatService {
        ReadRetrieveReadChatService::new(
            self.retriever.clone(),
            Arc::new(RecordingEmbedder {
                log: self.log.clone(),
                vector: vec![0.1, 0.2, 0.3],
            }),
            self.completer.clone(),
            CITATION_BASE_URL,
        )
    }
}

pub fn answer_json(answer: &str, thoughts: &str) -> String {
    serde_json::json!({ "answer": answer, "thoughts": thoughts }).to_string()
}
