//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::ApiResponse;
use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::api::types::ErrorResponse;
use crate::api::types::HealthResponse;
use crate::errors::ShopChatError;
use crate::rag::ChatPipeline;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

/// Error wrapper turning pipeline failures into HTTP responses
pub struct ApiError(pub ShopChatError);

impl From<ShopChatError> for ApiError {
    fn from(err: ShopChatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self.0 {
            ShopChatError::EmbeddingError(_) => "Embedding service unavailable",
            ShopChatError::SearchError(_) => "Product index unavailable",
            ShopChatError::CompletionError(_) => "Completion provider error",
            _ => "Internal server error",
        };
        (
            self.0.status_code(),
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// Chat page (GET /)
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.pipeline.options().mode.to_string(),
    }))
}

/// Answer a chat message (POST /chat)
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("POST /chat (context: {})", req.has_prior_context);

    match state.pipeline.respond(&req).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Error processing chat message: {}", e);
            Err(ApiError(e))
        }
    }
}
