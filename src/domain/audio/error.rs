use super::concatenator::MergeError;
use crate::error::AppError;
use crate::infrastructure::providers::ProviderError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Source {0} not found")]
    NotFound(String),
    #[error("Source {0} has no text content")]
    EmptyContent(String),
    #[error("Source {0} has no generated audio")]
    ArtifactMissing(String),
    #[error("No TTS provider configured")]
    NoProviderConfigured,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("synthesis failed on chunk {chunk}/{total}: {error}")]
    ProviderFailure {
        chunk: usize,
        total: usize,
        #[source]
        error: ProviderError,
    },
    #[error("failed to merge audio segments: {0}")]
    MergeFailure(#[from] MergeError),
    #[error("audio written to {} but the source record could not be updated: {message}", .path.display())]
    PersistenceFailure { path: PathBuf, message: String },
    #[error("audio storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("text store error: {0}")]
    StoreFailure(String),
}

/// Stable, serializable name of a [`PipelineError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineErrorKind {
    NotFound,
    EmptyContent,
    ArtifactMissing,
    NoProviderConfigured,
    Invalid,
    ProviderFailure,
    MergeFailure,
    PersistenceFailure,
    Storage,
    StoreFailure,
}

impl PipelineError {
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            Self::NotFound(_) => PipelineErrorKind::NotFound,
            Self::EmptyContent(_) => PipelineErrorKind::EmptyContent,
            Self::ArtifactMissing(_) => PipelineErrorKind::ArtifactMissing,
            Self::NoProviderConfigured => PipelineErrorKind::NoProviderConfigured,
            Self::Invalid(_) => PipelineErrorKind::Invalid,
            Self::ProviderFailure { .. } => PipelineErrorKind::ProviderFailure,
            Self::MergeFailure(_) => PipelineErrorKind::MergeFailure,
            Self::PersistenceFailure { .. } => PipelineErrorKind::PersistenceFailure,
            Self::Storage(_) => PipelineErrorKind::Storage,
            Self::StoreFailure(_) => PipelineErrorKind::StoreFailure,
        }
    }
}

impl From<AppError> for PipelineError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(msg) => PipelineError::NotFound(msg),
            AppError::BadRequest(msg) => PipelineError::Invalid(msg),
            _ => PipelineError::StoreFailure(err.to_string()),
        }
    }
}

impl PipelineErrorKind {
    /// HTTP-facing error for a failure of this kind
    pub fn into_app_error(self, message: String) -> AppError {
        match self {
            Self::NotFound | Self::ArtifactMissing => AppError::NotFound(message),
            Self::EmptyContent => AppError::Unprocessable(message),
            Self::Invalid => AppError::BadRequest(message),
            Self::NoProviderConfigured => AppError::ServiceUnavailable(message),
            Self::ProviderFailure => AppError::ExternalService(message),
            Self::MergeFailure | Self::PersistenceFailure | Self::Storage | Self::StoreFailure => {
                AppError::Internal(message)
            }
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        err.kind().into_app_error(err.to_string())
    }
}
