pub mod openai_provider;
pub mod polly_provider;

pub use openai_provider::OpenAiSpeechProvider;
pub use polly_provider::PollySpeechProvider;

use crate::domain::audio::AudioFormat;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned no audio")]
    EmptyAudio { provider: &'static str },
}

/// A text-to-speech backend (AWS Polly, OpenAI, ...).
///
/// Each instance carries a single resolved voice/model configuration. Callers
/// are responsible for keeping inputs within [`max_input_chars`] and for
/// issuing requests one at a time when ordering matters.
///
/// [`max_input_chars`]: SynthesisProvider::max_input_chars
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Container format of the bytes returned by [`SynthesisProvider::synthesize`]
    fn output_format(&self) -> AudioFormat;

    /// Longest input the provider accepts in one request
    fn max_input_chars(&self) -> usize;

    /// Synthesize one piece of text into encoded audio
    ///
    /// # Errors
    /// Returns error if the provider rejects the request or is unavailable
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

/// First 200 characters of `text`, for logs
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
