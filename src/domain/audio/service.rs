use super::error::PipelineError;
use super::format::AudioFormat;
use super::orchestrator::SynthesisOrchestrator;
use super::outcome::PipelineOutcome;
use crate::domain::source::Source;
use crate::infrastructure::providers::SynthesisProvider;
use crate::infrastructure::repositories::SourceRepository;
use crate::infrastructure::storage::AudioStorage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Per-run options for [`SourceAudioServiceApi::generate_with`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateAudioRequest {
    /// Overrides the configured chunk size for this run
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Recorded as the provenance of the artifact; a fresh id is used when absent
    #[serde(default)]
    pub command_id: Option<String>,
}

/// A stored artifact that exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub format: AudioFormat,
}

pub struct SourceAudioService {
    source_repo: Arc<dyn SourceRepository>,
    provider: Option<Arc<dyn SynthesisProvider>>,
    storage: Arc<AudioStorage>,
    orchestrator: SynthesisOrchestrator,
    default_chunk_size: usize,
}

impl SourceAudioService {
    pub fn new(
        source_repo: Arc<dyn SourceRepository>,
        provider: Option<Arc<dyn SynthesisProvider>>,
        storage: Arc<AudioStorage>,
        orchestrator: SynthesisOrchestrator,
        default_chunk_size: usize,
    ) -> Self {
        Self {
            source_repo,
            provider,
            storage,
            orchestrator,
            default_chunk_size,
        }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }

    async fn load(&self, source_id: &str) -> Result<Source, PipelineError> {
        self.source_repo
            .find_by_id(source_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(source_id.to_string()))
    }

    fn rejected(
        source_id: &str,
        error: PipelineError,
        started: Instant,
        total_characters: usize,
    ) -> PipelineOutcome {
        tracing::warn!(source_id, error = %error, "Audio generation rejected");
        PipelineOutcome::failed(&error, started.elapsed(), 0, total_characters)
    }
}

#[async_trait]
pub trait SourceAudioServiceApi: Send + Sync {
    /// Generate audio for a source with the configured defaults
    async fn generate(&self, source_id: &str) -> PipelineOutcome;

    /// Generate audio for a source.
    ///
    /// This operation:
    /// - Loads the source and checks it has text
    /// - Chunks and synthesizes the text with the configured provider
    /// - Records the artifact path and provenance on the source
    ///
    /// Failures are reported in the returned outcome, never as an `Err`.
    async fn generate_with(&self, source_id: &str, request: GenerateAudioRequest)
        -> PipelineOutcome;

    /// Locate the last generated artifact of a source
    async fn audio_artifact(&self, source_id: &str) -> Result<AudioArtifact, PipelineError>;
}

#[async_trait]
impl SourceAudioServiceApi for SourceAudioService {
    async fn generate(&self, source_id: &str) -> PipelineOutcome {
        self.generate_with(source_id, GenerateAudioRequest::default())
            .await
    }

    async fn generate_with(
        &self,
        source_id: &str,
        request: GenerateAudioRequest,
    ) -> PipelineOutcome {
        let started = Instant::now();

        let chunk_size = match request.chunk_size {
            Some(0) => {
                let error = PipelineError::Invalid("chunk_size must be greater than zero".into());
                return Self::rejected(source_id, error, started, 0);
            }
            Some(size) => size,
            None => self.default_chunk_size,
        };

        let source = match self.load(source_id).await {
            Ok(source) => source,
            Err(error) => return Self::rejected(source_id, error, started, 0),
        };

        let Some(text) = source.text().map(str::to_owned) else {
            let error = PipelineError::EmptyContent(source_id.to_string());
            return Self::rejected(source_id, error, started, 0);
        };
        let total_characters = text.chars().count();

        let Some(provider) = self.provider.as_ref() else {
            return Self::rejected(
                source_id,
                PipelineError::NoProviderConfigured,
                started,
                total_characters,
            );
        };

        let max_chunk_len = chunk_size.min(provider.max_input_chars());
        let workspace = self.storage.workspace(&source.id, provider.output_format());

        tracing::info!(
            source_id,
            text_length = total_characters,
            max_chunk_len,
            provider = provider.name(),
            "Generating audio for source"
        );

        let outcome = self
            .orchestrator
            .run(&workspace, &text, max_chunk_len, provider.as_ref())
            .await;
        if !outcome.success {
            return outcome.with_elapsed(started.elapsed());
        }

        let command_id = request
            .command_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let audio_file = outcome
            .audio_file_path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self
            .source_repo
            .update_audio(&source.id, &audio_file, &command_id)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    source_id,
                    command_id = %command_id,
                    audio_file = %audio_file,
                    "Source updated with generated audio"
                );
                outcome.with_elapsed(started.elapsed())
            }
            Err(e) => {
                tracing::error!(
                    source_id,
                    error = %e,
                    "Audio generated but the source could not be updated"
                );
                outcome
                    .into_persistence_failure(e.to_string())
                    .with_elapsed(started.elapsed())
            }
        }
    }

    async fn audio_artifact(&self, source_id: &str) -> Result<AudioArtifact, PipelineError> {
        let source = self.load(source_id).await?;

        let path = source
            .audio_file
            .map(PathBuf::from)
            .ok_or_else(|| PipelineError::ArtifactMissing(source_id.to_string()))?;

        if !tokio::fs::try_exists(&path).await? {
            tracing::warn!(source_id, path = %path.display(), "Recorded audio file is missing on disk");
            return Err(PipelineError::ArtifactMissing(source_id.to_string()));
        }

        let format = AudioFormat::from_path(&path)
            .ok_or_else(|| PipelineError::ArtifactMissing(source_id.to_string()))?;

        Ok(AudioArtifact { path, format })
    }
}
