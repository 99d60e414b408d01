//! REST API and WebSocket server for the operator view
//!
//! ## Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/history` - Rolling aggregate history
//! - `GET /api/v1/entities` - Entity ranking with alert levels
//! - `GET /api/v1/alerts` - Alert counts
//! - `GET|PUT /api/v1/thresholds` - Alert thresholds
//! - `GET|PUT /api/v1/polling` - Auto-refresh toggle and polling status
//! - `POST /api/v1/poll` - Run one tick now
//! - `WS /api/v1/stream` - Completed ticks as they happen

#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod middleware;
#[cfg(feature = "api")]
pub mod routes;
#[cfg(feature = "api")]
pub mod state;
#[cfg(feature = "api")]
pub mod types;
#[cfg(feature = "api")]
pub mod websocket;

#[cfg(feature = "api")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "api")]
pub use state::ApiState;
#[cfg(feature = "api")]
pub use types::{EntitiesResponse, HealthResponse, HistoryResponse, PollingRequest, PollingResponse};

#[cfg(feature = "api")]
use axum::{
    Router,
    routing::{get, post},
};
use std::net::{IpAddr, SocketAddr};
#[cfg(feature = "api")]
use tracing::info;

use crate::{config::ApiSettings, util};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    pub bind_addr: SocketAddr,

    /// Optional authentication token
    pub auth_token: Option<String>,

    /// Enable CORS for browser dashboards
    pub enable_cors: bool,
}

impl ApiConfig {
    /// Combine config file settings with environment fallbacks
    pub fn from_settings(settings: Option<&ApiSettings>) -> Self {
        let default = Self::default();

        match settings {
            Some(settings) => Self {
                bind_addr: settings.bind.unwrap_or(default.bind_addr),
                auth_token: settings.token.clone().or(default.auth_token),
                enable_cors: settings.cors,
            },
            None => default,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(util::get_addr()), util::get_port()),
            auth_token: util::get_api_token(),
            enable_cors: true,
        }
    }
}

/// Build the router with all routes and layers
#[cfg(feature = "api")]
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let mut app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/history", get(routes::history::get_history))
        .route("/api/v1/entities", get(routes::entities::list_entities))
        .route("/api/v1/alerts", get(routes::entities::get_alert_counts))
        .route(
            "/api/v1/thresholds",
            get(routes::thresholds::get_thresholds).put(routes::thresholds::put_thresholds),
        )
        .route(
            "/api/v1/polling",
            get(routes::polling::get_polling).put(routes::polling::put_polling),
        )
        .route("/api/v1/poll", post(routes::polling::poll_now))
        .route("/api/v1/stream", get(websocket::websocket_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    if let Some(token) = config.auth_token.clone() {
        app = app.layer(axum::middleware::from_fn_with_state(
            token,
            middleware::auth::auth_middleware,
        ));
    }

    app
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
#[cfg(feature = "api")]
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = router(&config, state);

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
