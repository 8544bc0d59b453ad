use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicegen_backend::controllers::generation::GenerationController;
use voicegen_backend::domain::generation::{
    GenerationService, GenerationServiceApi, GenerationWorker,
};
use voicegen_backend::infrastructure::config::{Config, LogFormat};
use voicegen_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use voicegen_backend::infrastructure::http::{create_router, start_http_server};
use voicegen_backend::infrastructure::queue::{InProcessQueue, RetryPolicy};
use voicegen_backend::infrastructure::repositories::{
    CloudinaryMediaRepository, ElevenLabsSpeechRepository, GenerationRepository,
    MediaRepository, PgGenerationRepository, SpeechRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting VoiceGen Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let pool = Arc::new(pool);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Repositories and provider clients. Missing credentials stop startup here.
    let generation_repo: Arc<dyn GenerationRepository> =
        Arc::new(PgGenerationRepository::new(pool.clone()));
    let speech_repo: Arc<dyn SpeechRepository> =
        Arc::new(ElevenLabsSpeechRepository::new(&config.elevenlabs)?);
    let media_repo: Arc<dyn MediaRepository> =
        Arc::new(CloudinaryMediaRepository::new(&config.cloudinary)?);
    tracing::info!("Speech and media clients initialized");

    // 2. Worker and queue
    let worker = Arc::new(GenerationWorker::new(
        generation_repo.clone(),
        speech_repo,
        media_repo,
    ));
    let policy = RetryPolicy::from(&config.jobs);
    let (queue, dispatcher) = InProcessQueue::start(worker, policy, config.jobs.concurrency);

    // 3. Services and controllers
    let generation_service = Arc::new(GenerationService::new(
        generation_repo.clone(),
        Arc::new(queue),
    ));

    match generation_service.requeue_unfinished().await {
        Ok(count) => tracing::info!(count = count, "Startup recovery finished"),
        Err(e) => tracing::error!(error = %e, "Could not re-enqueue unfinished generations"),
    }

    let generation_controller = Arc::new(GenerationController::new(generation_service));
    let app = create_router(generation_controller, generation_repo);

    start_http_server(app, &config.host, config.port, shutdown_signal()).await?;

    // The router owned the last queue handle; wait for in-flight work
    tracing::info!("HTTP server stopped, draining generation queue");
    dispatcher.await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "voicegen_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
