use crate::domain::audio::{AudioFormat, DEFAULT_CHUNK_SIZE};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Audio pipeline
    pub data_folder: PathBuf,
    pub tts_chunk_size: usize,
    pub tts_provider: ProviderKind,
    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub openai_tts_voice: String,
    pub openai_tts_format: AudioFormat,
    // AWS Polly
    pub aws_region: String,
    pub polly_voice: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which synthesis backend to wire at startup
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Polly,
    None,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "polly" => Ok(ProviderKind::Polly),
            "none" | "" => Ok(ProviderKind::None),
            other => Err(format!(
                "TTS_PROVIDER must be one of openai, polly or none, got '{}'",
                other
            )),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            database_url: lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080").parse()?,
            environment: match var("ENVIRONMENT", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match var("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            data_folder: PathBuf::from(var("DATA_FOLDER", "./data")),
            tts_chunk_size: parse_chunk_size(&var(
                "TTS_CHUNK_SIZE",
                &DEFAULT_CHUNK_SIZE.to_string(),
            ))?,
            tts_provider: var("TTS_PROVIDER", "openai").parse()?,
            openai_api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            openai_tts_model: var("OPENAI_TTS_MODEL", "tts-1"),
            openai_tts_voice: var("OPENAI_TTS_VOICE", "alloy"),
            openai_tts_format: var("OPENAI_TTS_FORMAT", "mp3")
                .parse()
                .map_err(|e| format!("OPENAI_TTS_FORMAT: {}", e))?,
            aws_region: var("AWS_REGION", "eu-west-1"),
            polly_voice: var("POLLY_VOICE", "Joanna"),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("TTS_CHUNK_SIZE must be greater than zero".to_string()),
        Ok(size) => Ok(size),
        Err(e) => Err(format!("TTS_CHUNK_SIZE must be a positive integer: {}", e)),
    }
}
