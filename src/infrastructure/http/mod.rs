pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::controllers::{
    content::ContentController,
    health::{self, HealthController},
    library::LibraryController,
    openai::OpenAiController,
    tts::TtsController,
};
use crate::infrastructure::config::Config;

/// Every controller the router dispatches to
pub struct Controllers {
    pub health: Arc<HealthController>,
    pub tts: Arc<TtsController>,
    pub library: Arc<LibraryController>,
    pub content: Arc<ContentController>,
    pub openai: Arc<OpenAiController>,
}

/// Build the application router. Files under `static_dir` are served at
/// `/static`, which is where cached audio URLs point.
pub fn create_router(controllers: Controllers, static_dir: &Path) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(controllers.health);

    let tts_routes = Router::new()
        .route("/api/synthesize", post(TtsController::synthesize))
        .route("/api/clear_cache", post(TtsController::clear_cache))
        .route("/api/cache_size", get(TtsController::cache_size))
        .route("/api/voices", get(TtsController::voices))
        .route("/api/engines", get(TtsController::engines))
        .route("/api/engines/:engine", patch(TtsController::set_engine_enabled))
        .with_state(controllers.tts);

    let content_routes = Router::new()
        .route("/api/read_website", post(ContentController::read_website))
        .route("/api/extract_text", post(ContentController::extract_text))
        .route("/api/detect_lang", post(ContentController::detect_lang))
        .with_state(controllers.content);

    let library_routes = Router::new()
        .route("/api/users", post(LibraryController::create_user))
        .route("/api/users/:username", get(LibraryController::get_user))
        .route(
            "/api/users/:username/books",
            get(LibraryController::list_books).post(LibraryController::add_book),
        )
        .route(
            "/api/users/:username/books/:book_id",
            patch(LibraryController::edit_book).delete(LibraryController::delete_book),
        )
        .route(
            "/api/users/:username/podcasts",
            get(LibraryController::list_podcasts),
        )
        .route(
            "/api/users/:username/podcasts/:podcast_id",
            axum::routing::delete(LibraryController::delete_podcast),
        )
        .route(
            "/api/users/:username/podcast",
            post(LibraryController::generate_podcast),
        )
        .with_state(controllers.library);

    let openai_routes = Router::new()
        .route("/v1/voices", get(OpenAiController::voices))
        .route("/v1/audio/speech", post(OpenAiController::speech))
        .with_state(controllers.openai);

    Router::new()
        .merge(health_routes)
        .merge(tts_routes)
        .merge(content_routes)
        .merge(library_routes)
        .merge(openai_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` until Ctrl-C
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
