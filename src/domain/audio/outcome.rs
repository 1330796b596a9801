use super::concatenator::MergeMethod;
use super::error::{PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Result of one generation run, as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file_path: Option<PathBuf>,
    /// Elapsed wall-clock seconds
    pub processing_time: f64,
    pub chunks_processed: usize,
    pub total_characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<PipelineErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<MergeMethod>,
}

impl PipelineOutcome {
    pub fn succeeded(
        audio_file_path: PathBuf,
        merge_method: MergeMethod,
        elapsed: Duration,
        chunks_processed: usize,
        total_characters: usize,
        warning_message: Option<String>,
    ) -> Self {
        Self {
            success: true,
            audio_file_path: Some(audio_file_path),
            processing_time: elapsed.as_secs_f64(),
            chunks_processed,
            total_characters,
            warning_message,
            error_message: None,
            error_kind: None,
            merge_method: Some(merge_method),
        }
    }

    pub fn failed(
        error: &PipelineError,
        elapsed: Duration,
        chunks_processed: usize,
        total_characters: usize,
    ) -> Self {
        Self {
            success: false,
            audio_file_path: None,
            processing_time: elapsed.as_secs_f64(),
            chunks_processed,
            total_characters,
            warning_message: None,
            error_message: Some(error.to_string()),
            error_kind: Some(error.kind()),
            merge_method: None,
        }
    }

    /// Downgrade a successful run whose record update failed. The artifact
    /// path is kept since the file exists on disk.
    pub fn into_persistence_failure(mut self, message: String) -> Self {
        let path = self.audio_file_path.clone().unwrap_or_default();
        let error = PipelineError::PersistenceFailure { path, message };
        self.success = false;
        self.error_message = Some(error.to_string());
        self.error_kind = Some(error.kind());
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.processing_time = elapsed.as_secs_f64();
        self
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning_message = warning;
        self
    }
}
