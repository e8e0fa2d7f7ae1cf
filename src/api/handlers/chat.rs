//! Chat API handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::info_span;
use tracing::Instrument;
use uuid::Uuid;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::errors::RagChatError;
use crate::models::ChatAppResponse;
use crate::models::ChatRequest;

pub type ChatError = (StatusCode, Json<ApiResponse<()>>);

/// Answer one chat turn (POST /api/chat)
///
/// The turn is cancelled if the client disconnects before it completes.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatAppResponse>, ChatError> {
    let request_id = Uuid::new_v4();

    async move {
        info!("POST /api/chat ({} messages)", req.messages.len());

        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        match state
            .chat_service
            .reply(&req.messages, req.overrides.as_ref(), &cancel)
            .await
        {
            Ok(response) => Ok(Json(response)),
            Err(e) => {
                error!("Error processing chat request: {}", e);
                Err(error_response(&e))
            }
        }
    }
    .instrument(info_span!("chat", %request_id))
    .await
}

/// Status code and body for a failed chat turn
pub fn error_response(err: &RagChatError) -> ChatError {
    let status = match err {
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        RagChatError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(err.to_string())))
}
