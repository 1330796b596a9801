use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::repositories::SourceRepository;

pub struct HealthState {
    pub source_repo: Arc<dyn SourceRepository>,
    pub provider_configured: bool,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let database_ok = state.source_repo.ping().await.is_ok();
    let ready = database_ok && state.provider_configured;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": if database_ok { "connected" } else { "disconnected" },
            "tts": if state.provider_configured { "available" } else { "not_configured" }
        })),
    )
}
