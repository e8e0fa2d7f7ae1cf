//! HTTP server implementation

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::ReadRetrieveReadChatService;
use crate::Result;

/// Build the application router with its middleware layers
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting docchat API server...");

    // Initialize services
    let chat_service = ReadRetrieveReadChatService::from_config(config)?;
    let state = AppState::new(chat_service);

    if state.chat_service.vision_enabled() {
        info!("🖼️  Image retrieval enabled");
    }
    if enable_cors {
        info!("✅ CORS enabled");
    }

    let app = build_router(state, enable_cors);

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET  /api/health         - Health check");
    info!("  GET  /api/examples       - Example questions");
    info!("  POST /api/chat           - Answer a chat turn");

    axum::serve(listener, app).await?;

    Ok(())
}
