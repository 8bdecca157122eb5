//! # HTTP Server
//!
//! Main HTTP server combining the API routers with the static pages.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::admin_routes::admin_routes;
use super::auth_routes::auth_routes;
use super::config::HttpServerConfig;
use super::request_routes::request_routes;
use super::room_routes::room_routes;
use super::state::AppState;

/// HTTP server for the room board
pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
    router: Router,
}

impl HttpServer {
    pub fn new(state: Arc<AppState>, config: HttpServerConfig) -> Self {
        let router = build_router(state.clone(), &config);
        Self {
            config,
            state,
            router,
        }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Start the HTTP server and serve until ctrl-c
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        match self.state.admin_count() {
            Ok(0) => warn!("No admins registered; create one with `roomwarden create-admin`"),
            Ok(count) => info!(admins = count, "Reviewer directory loaded"),
            Err(e) => warn!(error = ?e, "Could not count admins"),
        }

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, room = self.state.occupancy.room_name(), "HTTP server listening");
        info!(
            public_dir = %self.config.public_dir.display(),
            "Serving public page at / and admin page at /admin"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the combined router: JSON API under `/api`, pages from the public dir.
pub fn build_router(state: Arc<AppState>, config: &HttpServerConfig) -> Router {
    let api = Router::new()
        .merge(auth_routes(state.clone()))
        .merge(room_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .merge(request_routes(state));

    let admin_page = ServeFile::new(config.public_dir.join("admin.html"));

    let router = Router::new()
        .nest("/api", api)
        .route_service("/admin", admin_page)
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http());

    match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Cross-origin access is opt-in. The session cookie needs credentials, which
/// rules out wildcard origins.
fn cors_layer(config: &HttpServerConfig) -> Option<CorsLayer> {
    if config.cors_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
