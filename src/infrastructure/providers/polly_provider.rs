use super::{preview, ProviderError, SynthesisProvider};
use crate::domain::audio::AudioFormat;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

const PROVIDER: &str = "polly";

/// AWS Polly has a limit of 3000 characters per request
const MAX_INPUT_CHARS: usize = 3000;

/// AWS Polly neural engine with a fixed voice
pub struct PollySpeechProvider {
    polly_client: Arc<PollyClient>,
    voice: String,
}

impl PollySpeechProvider {
    pub fn new(polly_client: Arc<PollyClient>, voice: String) -> Self {
        Self {
            polly_client,
            voice,
        }
    }
}

#[async_trait]
impl SynthesisProvider for PollySpeechProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn output_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let start_time = std::time::Instant::now();
        let voice_id = VoiceId::from(self.voice.as_str());
        let engine = Engine::Neural;

        tracing::info!(
            voice_id = ?voice_id,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.chars().count(),
            text_preview = preview(text),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = %self.voice,
                    text_length = text.chars().count(),
                    "AWS Polly synthesize_speech failed"
                );
                ProviderError::Request {
                    provider: PROVIDER,
                    message: e.to_string(),
                }
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            ProviderError::Request {
                provider: PROVIDER,
                message: format!("failed to read audio stream: {}", e),
            }
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        if audio_bytes.is_empty() {
            return Err(ProviderError::EmptyAudio { provider: PROVIDER });
        }

        tracing::debug!(
            provider = PROVIDER,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "Audio stream collected successfully"
        );

        Ok(audio_bytes)
    }
}
