use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Extension, Json,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    domain::audio::{
        GenerateAudioRequest, PipelineOutcome, SourceAudioService, SourceAudioServiceApi,
    },
    error::{AppError, AppResult},
    infrastructure::request_id::RequestId,
};

pub struct SourceAudioController {
    audio_service: Arc<SourceAudioService>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SourceAudioController {
    pub fn new(audio_service: Arc<SourceAudioService>) -> Self {
        Self {
            audio_service,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// POST /api/sources/{sourceId}/audio - Generate audio for a source
    pub async fn generate_audio(
        State(controller): State<Arc<SourceAudioController>>,
        Path(source_id): Path<String>,
        request_id: Option<Extension<RequestId>>,
        body: Bytes,
    ) -> AppResult<(StatusCode, Json<PipelineOutcome>)> {
        let mut request = parse_request(&body)?;
        if request.command_id.is_none() {
            request.command_id = request_id.map(|Extension(RequestId(id))| id);
        }

        let _guard = InFlightGuard::acquire(&controller.in_flight, &source_id).ok_or_else(|| {
            AppError::Conflict(format!(
                "Audio generation already in progress for source {}",
                source_id
            ))
        })?;

        let outcome = controller
            .audio_service
            .generate_with(&source_id, request)
            .await;

        Ok((status_for(&outcome), Json(outcome)))
    }

    /// GET /api/sources/{sourceId}/audio - Download the generated audio
    pub async fn get_audio(
        State(controller): State<Arc<SourceAudioController>>,
        Path(source_id): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let artifact = controller.audio_service.audio_artifact(&source_id).await?;

        let audio = tokio::fs::read(&artifact.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read audio file: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(artifact.format.mime_type()),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(audio.len()));

        Ok((StatusCode::OK, headers, Body::from(audio)))
    }
}

/// An empty body means "use the defaults"; anything else must be valid options
fn parse_request(body: &[u8]) -> AppResult<GenerateAudioRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateAudioRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid audio generation options: {}", e)))
}

fn status_for(outcome: &PipelineOutcome) -> StatusCode {
    match outcome.error_kind {
        Some(kind) if !outcome.success => kind.into_app_error(String::new()).status_code(),
        _ => StatusCode::OK,
    }
}

/// Marks a source as being generated until dropped
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    source_id: String,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<String>>>, source_id: &str) -> Option<Self> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source_id.to_string());

        inserted.then(|| Self {
            in_flight: in_flight.clone(),
            source_id: source_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.source_id);
    }
}
