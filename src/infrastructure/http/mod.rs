pub mod request_id;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{generation::GenerationController, health};
use crate::infrastructure::repositories::GenerationRepository;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router with every route and the shared layers
pub fn create_router(
    generation_controller: Arc<GenerationController>,
    generation_repo: Arc<dyn GenerationRepository>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(generation_repo);

    let generation_routes = Router::new()
        .route("/generate", post(GenerationController::generate))
        .route("/generations", get(GenerationController::list_generations))
        .route("/generations/:id", get(GenerationController::get_generation))
        .with_state(generation_controller);

    Router::new()
        .merge(health_routes)
        .merge(generation_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware)),
        )
}

/// Serve `app` until `shutdown` resolves
pub async fn start_http_server(
    app: Router,
    host: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
