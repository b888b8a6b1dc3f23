//! HTTP surface: planning, report download and health probes

mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ServerError;
use crate::planner::Planner;
use crate::provider::create_model;
use crate::tracker::create_trackers;

/// Read-only state shared by every request
pub struct AppState {
    pub planner: Planner,
    pub port: u16,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &Config, planner: Planner) -> Self {
        Self {
            planner,
            port: config.server.port,
            request_timeout: Duration::from_secs(config.server.request_timeout_sec),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/react-agent", post(routes::react_agent))
        .route("/generate-report", post(routes::generate_report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &Config) -> Result<(), ServerError> {
    let planner = Planner::from_config(config, create_model(config), create_trackers(config));
    let state = Arc::new(AppState::from_config(config, planner));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C ({}); running until killed", e);
            std::future::pending::<()>().await;
        }
    }
}
