use axum::Router;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod fake_engine;

use api_client::TestClient;
use fake_engine::FakeEngine;

pub struct TestContext {
    pub client: TestClient,
    pub engine: Arc<FakeEngine>,
    pub static_dir: PathBuf,
    pub users_dir: PathBuf,
    _dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let static_dir = dir.path().join("static");
            let users_dir = dir.path().join("users");
            let engine = Arc::new(FakeEngine::default());

            let app = create_app_with_fake_engine(dir.path(), engine.clone());

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(50)).await;

            Self {
                client: TestClient::new(&base_url),
                engine,
                static_dir,
                users_dir,
                _dir: dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Temp directory is removed on drop
        }
    }
}

impl TestContext {
    /// Local path behind a `/static/...` URL
    pub fn static_path(&self, url: &str) -> PathBuf {
        self.static_dir.join(url.trim_start_matches("/static/"))
    }

    /// Poll until the artifact behind `url` exists
    pub async fn wait_for_audio(&self, url: &str) -> PathBuf {
        let path = self.static_path(url);
        for _ in 0..200 {
            if path.exists() {
                return path;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("audio {} never appeared", url);
    }
}

fn create_app_with_fake_engine(root: &Path, engine: Arc<FakeEngine>) -> Router {
    use tts_shelf::{
        controllers::{
            content::ContentController, health::HealthController, library::LibraryController,
            openai::OpenAiController, tts::TtsController,
        },
        domain::{
            content::ContentService,
            library::LibraryService,
            tts::{LanguageGuesser, TtsService},
        },
        infrastructure::{
            cache::AudioCacheStore,
            config::EngineSettings,
            http::{create_router, Controllers},
            repositories::UserRepository,
            scheduler::SynthesisScheduler,
        },
    };

    let static_dir = root.join("static");
    let settings = Arc::new(EngineSettings::defaults(root.join("engine_config.json")));
    let cache = Arc::new(AudioCacheStore::new(
        static_dir.join("audio_cache"),
        "/static/audio_cache",
    ));
    let user_repo = Arc::new(UserRepository::new(root.join("users")));
    let scheduler = Arc::new(SynthesisScheduler::new(engine.clone(), 2));

    let tts_service = Arc::new(TtsService::new(
        cache.clone(),
        scheduler,
        engine,
        settings,
        user_repo.clone(),
    ));
    let library_service = Arc::new(LibraryService::new(user_repo.clone(), tts_service.clone()));
    let content_service = Arc::new(ContentService::new(
        reqwest::Client::new(),
        Arc::new(LanguageGuesser::new()),
        false, // Disable cache in tests
    ));

    let controllers = Controllers {
        health: Arc::new(HealthController::new(cache, user_repo)),
        tts: Arc::new(TtsController::new(tts_service.clone())),
        library: Arc::new(LibraryController::new(library_service)),
        content: Arc::new(ContentController::new(content_service)),
        openai: Arc::new(OpenAiController::new(tts_service)),
    };

    create_router(controllers, &static_dir)
}
