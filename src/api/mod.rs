pub mod handlers;

use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::storage::MessageIndex;
use handlers::{health, search_messages, search_messages_json, SearchState};

/// Build the API router
pub fn create_router(index: Arc<dyn MessageIndex>, search_timeout: Option<Duration>) -> Router {
    let search_state = SearchState {
        index,
        timeout: search_timeout,
    };

    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/search",
            get(search_messages).post(search_messages_json),
        )
        .with_state(search_state)
        // CORS for development
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Start the API server with graceful shutdown support
pub async fn start_server_with_shutdown(
    router: Router,
    port: u16,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let shutdown_signal = async {
        shutdown_signal.await;
        info!("Shutdown signal received, stopping server gracefully...");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("API server stopped gracefully");
    Ok(())
}
