pub mod streaming;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controllers::{convert::ConvertController, health};
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;

/// Build the application router
pub fn build_router(convert_controller: Arc<ConvertController>, max_upload_bytes: usize) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(convert_controller.clone());

    let convert_routes = Router::new()
        .route("/convert", post(ConvertController::convert))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(convert_controller);

    Router::new()
        .merge(health_routes)
        .merge(convert_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    convert_controller: Arc<ConvertController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(convert_controller, config.max_upload_bytes);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
