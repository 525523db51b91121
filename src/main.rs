use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_shelf::controllers::{
    content::ContentController, health::HealthController, library::LibraryController,
    openai::OpenAiController, tts::TtsController,
};
use tts_shelf::domain::{
    content::ContentService,
    library::LibraryService,
    tts::{Credentials, LanguageGuesser, TtsService},
};
use tts_shelf::infrastructure::cache::AudioCacheStore;
use tts_shelf::infrastructure::config::{Config, EngineSettings, LogFormat};
use tts_shelf::infrastructure::engines::{
    CommandPipeline, EngineDispatcher, EngineSet, GeminiEngine, NeuralEngine, NeuralPipeline,
    OpenAiEngine, PiperEngine, SpeechSynthesizer,
};
use tts_shelf::infrastructure::http::{create_router, start_http_server, Controllers};
use tts_shelf::infrastructure::repositories::UserRepository;
use tts_shelf::infrastructure::scheduler::SynthesisScheduler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting tts-shelf on {}:{}", config.host, config.port);

    let config = Arc::new(config);
    let settings = Arc::new(EngineSettings::load(&config.engine_config_path).await);
    tracing::info!(
        enabled = ?settings.snapshot().await.enabled(),
        "Engine settings loaded"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Storage
    tracing::info!("Preparing storage...");
    let cache = Arc::new(AudioCacheStore::new(
        config.audio_cache_dir(),
        "/static/audio_cache",
    ));
    cache.ensure_root().await?;
    let user_repo = Arc::new(UserRepository::new(&config.users_dir));
    user_repo.ensure_dir().await?;

    // 2. Engines
    tracing::info!("Instantiating engines...");
    let guesser = Arc::new(LanguageGuesser::new());
    let http_client = reqwest::Client::new();
    let pipeline = |template: &Option<String>| -> Option<Arc<dyn NeuralPipeline>> {
        let pipeline = CommandPipeline::parse(template.as_deref()?)?;
        Some(Arc::new(pipeline))
    };
    let engines = EngineSet {
        piper: PiperEngine::new(&config.piper_binary, &config.models_dir),
        kokoro: NeuralEngine::kokoro(
            &config.models_dir,
            pipeline(&config.kokoro_command),
            guesser.clone(),
        ),
        coqui: NeuralEngine::coqui(
            &config.models_dir,
            pipeline(&config.coqui_command),
            guesser.clone(),
        ),
        kitten: NeuralEngine::kitten(pipeline(&config.kitten_command), guesser.clone()),
        gemini: GeminiEngine::new(
            http_client.clone(),
            &config.google_tts_endpoint,
            config.google_api_key.clone().and_then(Credentials::new),
        ),
        openai: OpenAiEngine::new(
            &config.openai_tts_model,
            config.openai_api_key.clone().and_then(Credentials::new),
        ),
    };
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(
        EngineDispatcher::new(engines, settings.clone(), config.engine_timeout())
            .with_normalization(config.normalize_audio),
    );
    let scheduler = Arc::new(SynthesisScheduler::new(
        synthesizer.clone(),
        config.max_concurrent_syntheses,
    ));

    // 3. Services
    tracing::info!("Instantiating services...");
    let tts_service = Arc::new(TtsService::new(
        cache.clone(),
        scheduler.clone(),
        synthesizer,
        settings,
        user_repo.clone(),
    ));
    let library_service = Arc::new(LibraryService::new(user_repo.clone(), tts_service.clone()));
    let content_service = Arc::new(ContentService::new(
        http_client,
        guesser,
        config.content_cache_enabled,
    ));

    // 4. Controllers
    tracing::info!("Instantiating controllers...");
    let controllers = Controllers {
        health: Arc::new(HealthController::new(cache, user_repo)),
        tts: Arc::new(TtsController::new(tts_service.clone())),
        library: Arc::new(LibraryController::new(library_service)),
        content: Arc::new(ContentController::new(content_service)),
        openai: Arc::new(OpenAiController::new(tts_service)),
    };

    // Start HTTP server with all routes
    let app = create_router(controllers, &config.static_dir);
    start_http_server(config, app).await?;

    tracing::info!("Waiting for in-flight syntheses...");
    scheduler.shutdown().await;

    Ok(())
}

fn init_logging(config: &Config) {
    let default_filter = if config.is_development() {
        "tts_shelf=debug,tower_http=debug"
    } else {
        "tts_shelf=info,tower_http=info"
    };

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_filter.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
