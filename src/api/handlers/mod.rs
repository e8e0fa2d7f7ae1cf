//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::rag::ReadRetrieveReadChatService;
use crate::samples::ExampleQuestions;

pub mod chat;

pub use chat::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ReadRetrieveReadChatService>,
    pub examples: Arc<ExampleQuestions>,
}

impl AppState {
    pub fn new(chat_service: ReadRetrieveReadChatService) -> Self {
        Self {
            chat_service: Arc::new(chat_service),
            examples: Arc::new(ExampleQuestions::new()),
        }
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        vision_enabled: state.chat_service.vision_enabled(),
    }))
}

/// Example questions (GET /api/examples)
pub async fn examples(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(
        state
            .examples
            .questions()
            .iter()
            .map(ToString::to_string)
            .collect(),
    ))
}
