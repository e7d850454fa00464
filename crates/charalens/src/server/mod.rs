//! HTTP surface: router construction and the serve loop.
//!
//! ```text
//! GET  /           health
//! GET  /health     health
//! POST /recognize  multipart upload (field "file") → recognition JSON
//! ```

pub mod errors;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use charalens_core::config::{LimitsConfig, ServerConfig};
use charalens_core::{Config, Recognizer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use errors::ApiError;
pub use handlers::AppState;

/// Slack for multipart boundaries and headers on top of the file limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router.
pub fn create_router(state: AppState, server: &ServerConfig, limits: &LimitsConfig) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/recognize", post(handlers::recognize))
        .layer(DefaultBodyLimit::max(max_body_bytes(limits)))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn max_body_bytes(limits: &LimitsConfig) -> usize {
    (limits.max_file_size_mb as usize) * 1024 * 1024 + MULTIPART_OVERHEAD_BYTES
}

/// CORS from the configured origins; `"*"` allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config, recognizer: Arc<Recognizer>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState { recognizer };
    let app = create_router(state, &config.server, &config.limits);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
