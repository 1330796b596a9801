use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    health::{self, HealthState},
    source_audio::SourceAudioController,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::request_id::request_id_middleware;

/// Build the application router with all routes configured
pub fn create_router(
    health_state: Arc<HealthState>,
    source_audio_controller: Arc<SourceAudioController>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(health_state);

    let source_audio_routes = Router::new()
        .route(
            "/api/sources/:source_id/audio",
            get(SourceAudioController::get_audio).post(SourceAudioController::generate_audio),
        )
        .with_state(source_audio_controller);

    Router::new()
        .merge(health_routes)
        .merge(source_audio_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
