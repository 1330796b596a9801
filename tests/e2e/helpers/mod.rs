use source_audio_backend::controllers::health::HealthState;
use source_audio_backend::controllers::source_audio::SourceAudioController;
use source_audio_backend::domain::audio::{
    CodecSupport, Concatenator, SourceAudioService, SynthesisOrchestrator,
};
use source_audio_backend::domain::source::Source;
use source_audio_backend::infrastructure::http::create_router;
use source_audio_backend::infrastructure::providers::SynthesisProvider;
use source_audio_backend::infrastructure::storage::AudioStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;

use api_client::TestClient;
use fakes::{FakeProvider, InMemorySourceRepository};

pub const CHUNK_SIZE: usize = 4000;

pub struct TestContext {
    pub client: TestClient,
    pub repo: Arc<InMemorySourceRepository>,
    pub provider: Option<Arc<FakeProvider>>,
    data_dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        Self::start(Some(FakeProvider::new()))
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The data folder is removed when the TempDir drops
        }
    }
}

impl TestContext {
    /// Boot the app with the given provider, or none at all
    pub async fn start(provider: Option<FakeProvider>) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create data folder");
        let repo = Arc::new(InMemorySourceRepository::default());
        let provider = provider.map(Arc::new);

        let audio_service = Arc::new(SourceAudioService::new(
            repo.clone(),
            provider
                .clone()
                .map(|p| p as Arc<dyn SynthesisProvider>),
            Arc::new(AudioStorage::new(data_dir.path())),
            SynthesisOrchestrator::new(Concatenator::new(CodecSupport::detect())),
            CHUNK_SIZE,
        ));
        let health_state = Arc::new(HealthState {
            source_repo: repo.clone(),
            provider_configured: provider.is_some(),
        });
        let app = create_router(
            health_state,
            Arc::new(SourceAudioController::new(audio_service)),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: TestClient::new(&base_url),
            repo,
            provider,
            data_dir,
        }
    }

    pub fn provider(&self) -> &FakeProvider {
        self.provider.as_deref().expect("No provider configured")
    }

    pub fn add_source(&self, id: &str, text: &str) -> Source {
        let source = Source::new(id, text);
        self.repo.insert(source.clone());
        source
    }

    pub fn source_dir(&self, id: &str) -> PathBuf {
        AudioStorage::new(self.data_dir.path()).source_dir(id)
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }
}

/// Text of `count` sentences, each exactly 100 characters including the trailing space
pub fn sentences(count: usize) -> String {
    format!("{}. ", "a".repeat(98)).repeat(count)
}

/// File names in a directory, sorted; empty if it does not exist
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
