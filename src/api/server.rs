//! HTTP server implementation

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::BoxError;
use axum::Json;
use axum::Router;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::api::types::ErrorResponse;
use crate::config::AppConfig;
use crate::services::ServiceContainer;
use crate::Result;

/// Upper bound for a whole `/chat` request: one slot per sequential upstream call
fn request_deadline(config: &AppConfig) -> Duration {
    config.request_timeout() * 4
}

/// Map middleware errors; a blown request deadline is a gateway timeout
async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        warn!("Request exceeded its deadline");
        (
            StatusCode::GATEWAY_TIMEOUT,
            Json(ErrorResponse {
                error: "Upstream services timed out".to_string(),
            }),
        )
            .into_response()
    } else {
        tracing::error!("Unhandled middleware error: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}

/// Router with the middleware stack used in production
pub fn build_app(state: AppState, deadline: Duration, enable_cors: bool) -> Router {
    let deadline_layer = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(deadline));

    let mut app = routes::api_routes(state)
        .layer(deadline_layer)
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
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting shopchat server...");

    let services = ServiceContainer::from_config(config)?;
    let state = AppState {
        pipeline: services.pipeline.clone(),
    };

    let app = build_app(state, request_deadline(config), enable_cors);
    if enable_cors {
        info!("✅ CORS enabled");
    }

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /        - Chat page");
    info!("  GET  /health  - Health check");
    info!("  POST /chat    - Chat message");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    drop(services);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
