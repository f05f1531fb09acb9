//! REST API over the event store and metric window
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /logs`, `/logs/id/:id`, `/logs/type/:type` - Event history
//! - `GET|POST|DELETE /stored/id/:id`, `/stored/type/:type`, `GET /stored` - Pinned events
//! - `GET /metrics/{cpu,ram,disk,temperature,current}` - Latest sample
//! - `GET /metrics/average/:minutes` - Windowed average

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{CountResponse, HealthResponse};

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;

/// Build the router with all routes
pub fn router(state: ApiState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/logs", get(routes::logs::list_logs))
        .route("/logs/id/:id", get(routes::logs::get_log))
        .route("/logs/type/:type", get(routes::logs::get_logs_by_type))
        .route("/stored", get(routes::stored::list_stored))
        .route(
            "/stored/id/:id",
            get(routes::stored::get_stored)
                .post(routes::stored::pin_log)
                .delete(routes::stored::unpin_log),
        )
        .route(
            "/stored/type/:type",
            get(routes::stored::get_stored_by_type)
                .post(routes::stored::pin_by_type)
                .delete(routes::stored::unpin_by_type),
        )
        .route("/metrics/cpu", get(routes::metrics::cpu_usage))
        .route("/metrics/ram", get(routes::metrics::ram_usage))
        .route("/metrics/disk", get(routes::metrics::disk_usage))
        .route("/metrics/temperature", get(routes::metrics::temperature))
        .route("/metrics/current", get(routes::metrics::current))
        .route("/metrics/average/:minutes", get(routes::metrics::average))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = router(state, config.enable_cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
