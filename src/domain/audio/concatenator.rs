use super::format::AudioFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("no audio segments to merge")]
    Empty,
    #[error("no safe way to merge {0} segments without a codec")]
    Unsupported(AudioFormat),
    #[error("segment {path} does not match the stream parameters of the first segment")]
    Mismatch { path: PathBuf },
    #[error("codec error in {path}: {message}")]
    Codec { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// How a run's segments ended up in the final artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// One segment, used as the artifact directly
    Single,
    /// Decoded and re-encoded once
    Decoded,
    /// Raw bytes appended; playable only for frame-safe formats
    ByteConcat,
}

/// Which formats this build can decode and re-encode.
///
/// Resolved once at startup so the merge path is an explicit choice rather
/// than a reaction to a failed decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecSupport {
    wav: bool,
}

impl CodecSupport {
    /// Codecs compiled into this binary
    pub fn detect() -> Self {
        Self {
            wav: cfg!(feature = "codec"),
        }
    }

    /// No codecs; every merge must take the byte path
    pub fn none() -> Self {
        Self { wav: false }
    }

    pub fn decodes(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Wav => self.wav,
            AudioFormat::Mp3 => false,
        }
    }
}

pub struct Concatenator {
    codecs: CodecSupport,
}

impl Concatenator {
    pub fn new(codecs: CodecSupport) -> Self {
        Self { codecs }
    }

    /// Pick the merge path for `format`, or fail if neither path is safe
    pub fn method_for(&self, format: AudioFormat) -> Result<MergeMethod, MergeError> {
        if self.codecs.decodes(format) {
            Ok(MergeMethod::Decoded)
        } else if format.frames_self_delimiting() {
            Ok(MergeMethod::ByteConcat)
        } else {
            Err(MergeError::Unsupported(format))
        }
    }

    /// Merge `segments` in order into `dest`.
    ///
    /// Output is written to a `.part` sibling and renamed into place only once
    /// complete, so a failed merge never leaves a truncated artifact behind.
    pub async fn merge(
        &self,
        segments: &[PathBuf],
        format: AudioFormat,
        dest: &Path,
    ) -> Result<MergeMethod, MergeError> {
        if segments.is_empty() {
            return Err(MergeError::Empty);
        }

        let method = self.method_for(format)?;
        let part = part_path(dest);

        let result = match method {
            MergeMethod::Decoded => decode_merge(segments, format, &part).await,
            MergeMethod::ByteConcat | MergeMethod::Single => concat_bytes(segments, &part).await,
        };

        if let Err(e) = result {
            discard_part(&part).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&part, dest).await {
            discard_part(&part).await;
            return Err(e.into());
        }

        match method {
            MergeMethod::ByteConcat => tracing::warn!(
                segment_count = segments.len(),
                format = %format,
                dest = %dest.display(),
                "No codec available, concatenated audio segments byte-wise"
            ),
            _ => tracing::info!(
                segment_count = segments.len(),
                format = %format,
                dest = %dest.display(),
                "Concatenated audio segments"
            ),
        }

        Ok(method)
    }
}

/// Temporary sibling used while an artifact is being written
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

pub(super) async fn discard_part(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %part.display(), error = %e, "Failed to remove partial artifact");
        }
    }
}

/// Append segment bytes in order, reading one segment at a time.
///
/// ID3v2 tags on every segment but the first are dropped so the joined stream
/// has a single leading tag.
async fn concat_bytes(segments: &[PathBuf], part: &Path) -> Result<(), MergeError> {
    let mut out = tokio::fs::File::create(part).await?;

    for (i, segment) in segments.iter().enumerate() {
        let bytes = tokio::fs::read(segment).await?;
        let frames = if i == 0 {
            &bytes[..]
        } else {
            strip_id3v2(&bytes)
        };
        out.write_all(frames).await?;
    }

    out.flush().await?;
    out.sync_all().await?;
    Ok(())
}

/// Skip a leading ID3v2 tag, if any
fn strip_id3v2(bytes: &[u8]) -> &[u8] {
    if bytes.len() < 10 || &bytes[..3] != b"ID3" {
        return bytes;
    }

    // Tag size is a 28-bit syncsafe integer, excluding the 10-byte header
    let size = bytes[6..10]
        .iter()
        .fold(0usize, |acc, b| (acc << 7) | (*b as usize & 0x7f));
    let footer = if bytes[5] & 0x10 != 0 { 10 } else { 0 };
    let end = (10 + size + footer).min(bytes.len());

    &bytes[end..]
}

#[cfg(feature = "codec")]
async fn decode_merge(
    segments: &[PathBuf],
    format: AudioFormat,
    part: &Path,
) -> Result<(), MergeError> {
    match format {
        AudioFormat::Wav => {
            let segments = segments.to_vec();
            let part = part.to_path_buf();
            tokio::task::spawn_blocking(move || wav::merge(&segments, &part))
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
        }
        AudioFormat::Mp3 => Err(MergeError::Unsupported(format)),
    }
}

#[cfg(not(feature = "codec"))]
async fn decode_merge(
    _segments: &[PathBuf],
    format: AudioFormat,
    _part: &Path,
) -> Result<(), MergeError> {
    Err(MergeError::Unsupported(format))
}

#[cfg(feature = "codec")]
mod wav {
    use super::MergeError;
    use std::io::{Read, Seek, Write};
    use std::path::{Path, PathBuf};

    fn codec_error(path: &Path, e: hound::Error) -> MergeError {
        MergeError::Codec {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }

    /// Decode every segment and re-encode the samples once, under the first
    /// segment's stream parameters.
    pub(super) fn merge(segments: &[PathBuf], part: &Path) -> Result<(), MergeError> {
        let (first, rest) = segments.split_first().ok_or(MergeError::Empty)?;

        let reader = hound::WavReader::open(first).map_err(|e| codec_error(first, e))?;
        let spec = reader.spec();
        let mut writer = hound::WavWriter::create(part, spec).map_err(|e| codec_error(part, e))?;
        append_samples(reader, &mut writer, first)?;

        for path in rest {
            let reader = hound::WavReader::open(path).map_err(|e| codec_error(path, e))?;
            if reader.spec() != spec {
                return Err(MergeError::Mismatch { path: path.clone() });
            }
            append_samples(reader, &mut writer, path)?;
        }

        writer.finalize().map_err(|e| codec_error(part, e))
    }

    fn append_samples<R: Read, W: Write + Seek>(
        mut reader: hound::WavReader<R>,
        writer: &mut hound::WavWriter<W>,
        path: &Path,
    ) -> Result<(), MergeError> {
        match reader.spec().sample_format {
            hound::SampleFormat::Float => {
                for sample in reader.samples::<f32>() {
                    let sample = sample.map_err(|e| codec_error(path, e))?;
                    writer.write_sample(sample).map_err(|e| codec_error(path, e))?;
                }
            }
            hound::SampleFormat::Int => {
                for sample in reader.samples::<i32>() {
                    let sample = sample.map_err(|e| codec_error(path, e))?;
                    writer.write_sample(sample).map_err(|e| codec_error(path, e))?;
                }
            }
        }
        Ok(())
    }
}
