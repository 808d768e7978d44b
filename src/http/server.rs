//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router that forwards every request to the route table
//! - Wire up middleware (tracing, timeouts, request ID)
//! - Translate dispatch outcomes into HTTP responses
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::{Extensions, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::request::{request_id_middleware, RequestId};
use crate::observability::metrics::{self, Outcome};
use crate::routing::Router;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
    pub debug_errors: bool,
}

/// HTTP front end for a [`Router`].
pub struct HttpServer {
    app: axum::Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(router: Router, config: ServerConfig) -> Self {
        let state = AppState {
            router: Arc::new(router),
            debug_errors: config.router.debug_errors,
        };
        let app = Self::build_router(&config, state);
        Self { app, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// The assembled service, for embedding or in-process testing.
    pub fn into_router(self) -> axum::Router {
        self.app
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Dispatch every request through the route table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut data = Extensions::new();
    if let Some(id) = request.extensions().get::<RequestId>() {
        data.insert(id.clone());
    }

    match state.router.dispatch_with(request, data).await {
        Ok(Some(response)) => {
            metrics::record_dispatch(&method, Outcome::Handled, start);
            response.into_axum()
        }
        Ok(None) => {
            tracing::debug!(method = %method, path = %path, "No response produced");
            metrics::record_dispatch(&method, Outcome::NotFound, start);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(err) => {
            tracing::error!(method = %method, path = %path, error = %err, "Dispatch failed");
            metrics::record_dispatch(&method, Outcome::Error, start);
            let body = if state.debug_errors {
                err.to_string()
            } else {
                "Internal Server Error".to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
