use super::chunker::{chunk_text, Chunk};
use super::concatenator::{discard_part, part_path, Concatenator, MergeMethod};
use super::error::PipelineError;
use super::outcome::PipelineOutcome;
use crate::infrastructure::providers::SynthesisProvider;
use crate::infrastructure::storage::SourceWorkspace;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Drives one chunk → audio → merge run.
///
/// Chunks are synthesized strictly in order, one request at a time, and each
/// segment goes to disk as soon as it arrives. Any failure aborts the whole run;
/// nothing is merged from a partial set of segments.
pub struct SynthesisOrchestrator {
    concatenator: Concatenator,
}

/// Progress that survives a failed run, for the outcome
#[derive(Debug, Default)]
struct RunProgress {
    chunks_attempted: usize,
    warnings: Vec<String>,
}

impl RunProgress {
    fn warning(&self) -> Option<String> {
        if self.warnings.is_empty() {
            None
        } else {
            Some(self.warnings.join(" "))
        }
    }
}

impl SynthesisOrchestrator {
    pub fn new(concatenator: Concatenator) -> Self {
        Self { concatenator }
    }

    /// Synthesize `text` into `workspace.artifact_path()`.
    ///
    /// `max_chunk_len` is in characters. The workspace format must match the
    /// provider's output format.
    pub async fn run(
        &self,
        workspace: &SourceWorkspace,
        text: &str,
        max_chunk_len: usize,
        provider: &dyn SynthesisProvider,
    ) -> PipelineOutcome {
        let started = Instant::now();
        let total_characters = text.chars().count();
        let mut progress = RunProgress::default();

        match self
            .execute(workspace, text, max_chunk_len, provider, &mut progress)
            .await
        {
            Ok((artifact, merge_method)) => {
                let elapsed = started.elapsed();
                tracing::info!(
                    source_id = workspace.source_id(),
                    artifact = %artifact.display(),
                    chunk_count = progress.chunks_attempted,
                    total_characters,
                    merge_method = ?merge_method,
                    latency_ms = elapsed.as_millis(),
                    "Audio generation completed"
                );
                PipelineOutcome::succeeded(
                    artifact,
                    merge_method,
                    elapsed,
                    progress.chunks_attempted,
                    total_characters,
                    progress.warning(),
                )
            }
            Err(error) => {
                tracing::error!(
                    source_id = workspace.source_id(),
                    error = %error,
                    chunks_attempted = progress.chunks_attempted,
                    "Audio generation failed"
                );
                PipelineOutcome::failed(
                    &error,
                    started.elapsed(),
                    progress.chunks_attempted,
                    total_characters,
                )
                .with_warning(progress.warning())
            }
        }
    }

    async fn execute(
        &self,
        workspace: &SourceWorkspace,
        text: &str,
        max_chunk_len: usize,
        provider: &dyn SynthesisProvider,
        progress: &mut RunProgress,
    ) -> Result<(PathBuf, MergeMethod), PipelineError> {
        let format = workspace.format();

        let chunks = chunk_text(text, max_chunk_len);
        let chunk_count = chunks.len();
        if chunk_count == 0 {
            return Err(PipelineError::EmptyContent(workspace.source_id().to_string()));
        }

        if chunk_count > 1 {
            let warning = format!(
                "Source text was split into {} chunks for processing. Total length: {} characters.",
                chunk_count,
                text.chars().count()
            );
            tracing::warn!(source_id = workspace.source_id(), "{}", warning);
            progress.warnings.push(warning);

            // Fail before spending provider calls on segments that cannot be joined
            self.concatenator.method_for(format)?;
        }

        workspace.prepare().await?;
        let artifact = workspace.artifact_path();

        tracing::info!(
            source_id = workspace.source_id(),
            chunk_count,
            provider = provider.name(),
            format = %format,
            "Processing chunk(s)"
        );

        // A lone segment is the artifact itself; only multi-chunk runs leave
        // intermediates behind
        let mut segments = SegmentFiles::default();
        for chunk in &chunks {
            progress.chunks_attempted = chunk.index;
            let path = if chunk_count == 1 {
                artifact.clone()
            } else {
                workspace.chunk_path(chunk.index)
            };
            self.synthesize_chunk(chunk, chunk_count, provider, &path)
                .await?;
            if chunk_count > 1 {
                segments.push(path);
            }
        }

        let merge_method = if chunk_count == 1 {
            MergeMethod::Single
        } else {
            tracing::info!(
                source_id = workspace.source_id(),
                chunk_count,
                "Concatenating audio chunks"
            );
            self.concatenator
                .merge(segments.paths(), format, &artifact)
                .await?
        };

        if merge_method == MergeMethod::ByteConcat {
            progress.warnings.push(format!(
                "Audio chunks were joined by byte concatenation because no {} codec is available.",
                format
            ));
        }

        segments.cleanup().await;

        Ok((artifact, merge_method))
    }

    async fn synthesize_chunk(
        &self,
        chunk: &Chunk,
        chunk_count: usize,
        provider: &dyn SynthesisProvider,
        path: &Path,
    ) -> Result<(), PipelineError> {
        tracing::info!(
            chunk_index = chunk.index,
            chunk_count,
            chunk_chars = chunk.char_len,
            "Generating audio for chunk"
        );

        let audio = provider
            .synthesize(&chunk.text)
            .await
            .map_err(|error| PipelineError::ProviderFailure {
                chunk: chunk.index,
                total: chunk_count,
                error,
            })?;

        write_atomically(path, &audio).await?;

        tracing::info!(
            chunk_index = chunk.index,
            audio_size_bytes = audio.len(),
            path = %path.display(),
            "Saved chunk audio"
        );

        Ok(())
    }
}

/// Write via a `.part` sibling so readers never see a half-written file
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let part = part_path(path);
    if let Err(e) = tokio::fs::write(&part, bytes).await {
        discard_part(&part).await;
        return Err(e);
    }
    tokio::fs::rename(&part, path).await
}

/// Intermediate chunk files of one run.
///
/// Removed by [`SegmentFiles::cleanup`] on success, and on drop otherwise, which
/// covers both failed runs and a run future dropped mid-flight.
#[derive(Debug, Default)]
struct SegmentFiles {
    paths: Vec<PathBuf>,
}

impl SegmentFiles {
    fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    async fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Deleted temporary chunk"),
                Err(e) => log_cleanup_failure(&path, &e),
            }
        }
    }
}

impl Drop for SegmentFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                log_cleanup_failure(&path, &e);
            }
        }
    }
}

fn log_cleanup_failure(path: &Path, e: &std::io::Error) {
    if e.kind() != std::io::ErrorKind::NotFound {
        tracing::warn!(path = %path.display(), error = %e, "Failed to delete temporary chunk");
    }
}
