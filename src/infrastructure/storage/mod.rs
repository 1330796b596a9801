use crate::domain::audio::AudioFormat;
use std::path::{Path, PathBuf};

/// Root of the on-disk audio layout: `{data_folder}/sources/{source}/audio.{ext}`
#[derive(Debug, Clone)]
pub struct AudioStorage {
    data_folder: PathBuf,
}

impl AudioStorage {
    pub fn new(data_folder: impl Into<PathBuf>) -> Self {
        Self {
            data_folder: data_folder.into(),
        }
    }

    /// Working directory for one source
    pub fn source_dir(&self, source_id: &str) -> PathBuf {
        self.data_folder
            .join("sources")
            .join(directory_name(source_id))
    }

    pub fn workspace(&self, source_id: &str, format: AudioFormat) -> SourceWorkspace {
        SourceWorkspace {
            source_id: source_id.to_string(),
            dir: self.source_dir(source_id),
            format,
        }
    }
}

/// Deterministic file paths used by one pipeline run
#[derive(Debug, Clone)]
pub struct SourceWorkspace {
    source_id: String,
    dir: PathBuf,
    format: AudioFormat,
}

impl SourceWorkspace {
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Final artifact, `audio.<ext>`
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(format!("audio.{}", self.format.extension()))
    }

    /// Intermediate segment for a 1-based chunk index, `audio_chunk_NNN.<ext>`
    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("audio_chunk_{:03}.{}", index, self.format.extension()))
    }

    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }
}

/// Map a source identifier onto a single safe path component.
///
/// `[A-Za-z0-9-]` is kept as is. Every other byte, `_` included, becomes
/// `_XX` (uppercase hex), so the mapping is one-to-one and ids such as
/// `source:abc` or `../etc` cannot escape the data folder.
fn directory_name(source_id: &str) -> String {
    if source_id.is_empty() {
        return "_".to_string();
    }

    let mut name = String::with_capacity(source_id.len());
    for byte in source_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("_{:02X}", byte));
        }
    }
    name
}
