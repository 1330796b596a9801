use async_openai::{config::OpenAIConfig, Client};
use source_audio_backend::controllers::health::HealthState;
use source_audio_backend::controllers::source_audio::SourceAudioController;
use source_audio_backend::domain::audio::{
    AudioFormat, CodecSupport, Concatenator, SourceAudioService, SynthesisOrchestrator,
};
use source_audio_backend::infrastructure::config::{Config, LogFormat, ProviderKind};
use source_audio_backend::infrastructure::db::{check_connection, create_pool};
use source_audio_backend::infrastructure::http::{create_router, start_http_server};
use source_audio_backend::infrastructure::providers::{
    OpenAiSpeechProvider, PollySpeechProvider, SynthesisProvider,
};
use source_audio_backend::infrastructure::repositories::{PgSourceRepository, SourceRepository};
use source_audio_backend::infrastructure::storage::AudioStorage;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Source Audio Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories and storage
    tracing::info!("Instantiating repositories...");
    let source_repo: Arc<dyn SourceRepository> = Arc::new(PgSourceRepository::new(pool.clone()));
    let storage = Arc::new(AudioStorage::new(config.data_folder.clone()));

    // 2. Instantiate the synthesis provider
    let provider = create_provider(&config).await;

    // 3. Instantiate services
    tracing::info!("Instantiating services...");
    let codecs = CodecSupport::detect();
    tracing::info!(wav_codec = codecs.decodes(AudioFormat::Wav), "Audio codec support detected");
    if let Some(format) = provider.as_ref().map(|p| p.output_format()) {
        if !codecs.decodes(format) && !format.frames_self_delimiting() {
            tracing::warn!(
                format = %format,
                "Provider output cannot be merged in this build, multi-chunk sources will fail"
            );
        }
    }
    let audio_service = Arc::new(SourceAudioService::new(
        source_repo.clone(),
        provider.clone(),
        storage,
        SynthesisOrchestrator::new(Concatenator::new(codecs)),
        config.tts_chunk_size,
    ));

    // 4. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let source_audio_controller = Arc::new(SourceAudioController::new(audio_service));
    let health_state = Arc::new(HealthState {
        source_repo,
        provider_configured: provider.is_some(),
    });

    // Start HTTP server with all routes
    let app = create_router(health_state, source_audio_controller);
    start_http_server(config, app).await?;

    Ok(())
}

async fn create_provider(config: &Config) -> Option<Arc<dyn SynthesisProvider>> {
    match config.tts_provider {
        ProviderKind::OpenAi => {
            let Some(api_key) = config.openai_api_key.clone() else {
                tracing::warn!("OPENAI_API_KEY not set, audio generation is disabled");
                return None;
            };
            let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            tracing::info!(
                model = %config.openai_tts_model,
                voice = %config.openai_tts_voice,
                format = %config.openai_tts_format,
                "OpenAI TTS provider initialized"
            );
            Some(Arc::new(
                OpenAiSpeechProvider::new(
                    Arc::new(client),
                    config.openai_tts_model.clone(),
                    config.openai_tts_voice.clone(),
                )
                .with_format(config.openai_tts_format),
            ))
        }
        ProviderKind::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            let polly_client = aws_sdk_polly::Client::new(&aws_config);
            tracing::info!(voice = %config.polly_voice, "AWS Polly provider initialized");

            Some(Arc::new(PollySpeechProvider::new(
                Arc::new(polly_client),
                config.polly_voice.clone(),
            )))
        }
        ProviderKind::None => {
            tracing::warn!("TTS_PROVIDER is none, audio generation is disabled");
            None
        }
    }
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_development() {
        "source_audio_backend=debug,tower_http=debug"
    } else {
        "source_audio_backend=info,tower_http=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
