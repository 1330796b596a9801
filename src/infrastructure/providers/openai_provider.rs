use super::{preview, ProviderError, SynthesisProvider};
use crate::domain::audio::AudioFormat;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

const PROVIDER: &str = "openai";

/// OpenAI has a limit of 4096 characters per request
const MAX_INPUT_CHARS: usize = 4096;

/// OpenAI speech endpoint with a fixed model, voice and response format
pub struct OpenAiSpeechProvider {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    voice: String,
    format: AudioFormat,
}

impl OpenAiSpeechProvider {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, voice: String) -> Self {
        Self {
            client,
            model,
            voice,
            format: AudioFormat::Mp3,
        }
    }

    /// Request `format` instead of the default MP3
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    fn response_format(&self) -> SpeechResponseFormat {
        match self.format {
            AudioFormat::Mp3 => SpeechResponseFormat::Mp3,
            AudioFormat::Wav => SpeechResponseFormat::Wav,
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn speech_voice(&self) -> Voice {
        match self.voice.to_lowercase().as_str() {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        }
    }
}

#[async_trait]
impl SynthesisProvider for OpenAiSpeechProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn output_format(&self) -> AudioFormat {
        self.format
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %self.model,
            voice = %self.voice,
            format = %self.format,
            text_length = text.chars().count(),
            text_preview = preview(text),
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: self.speech_voice(),
            response_format: Some(self.response_format()),
            speed: None,
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %self.voice,
                text_length = text.chars().count(),
                "OpenAI TTS API call failed"
            );
            ProviderError::Request {
                provider: PROVIDER,
                message: e.to_string(),
            }
        })?;

        let audio_bytes = response.bytes.to_vec();
        if audio_bytes.is_empty() {
            return Err(ProviderError::EmptyAudio { provider: PROVIDER });
        }

        tracing::debug!(
            provider = PROVIDER,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "OpenAI TTS audio received"
        );

        Ok(audio_bytes)
    }
}
