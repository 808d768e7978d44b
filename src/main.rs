//! worker-router demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum (trace, request id, timeout)
//!                       │
//!                       ▼
//!                  Router::dispatch
//!                       │  match every route in order
//!                       ▼
//!                  Chain: logger → users → books → handler
//!                       │  unwinds in reverse
//!                       ▼
//!     ◀────────────── finalized Response, or 404 / 500
//! ```

use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tokio::net::TcpListener;

use worker_router::config::{load_config, RouterConfig, ServerConfig};
use worker_router::observability::{logging, metrics};
use worker_router::{HttpServer, ResponseInit, Router};

#[derive(Debug, Parser)]
#[command(name = "worker-router", version, about = "Serve the demo route table")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn demo_router(config: RouterConfig) -> Router {
    let mut books = Router::with_config(config);
    books.get("/:bookId").handle(|ctx, _next| {
        Box::pin(async move {
            let body = json!({
                "user": ctx.param("userId"),
                "book": ctx.param("bookId"),
            });
            ctx.json(&body, ResponseInit::new())?;
            Ok(())
        })
    });

    let mut router = Router::with_config(config);
    router.all("(.*)").middleware(|ctx, next| {
        Box::pin(async move {
            let start = Instant::now();
            next.run(ctx).await?;
            tracing::info!(
                method = %ctx.method(),
                path = ctx.url().path(),
                status = ctx.response().status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Handled"
            );
            Ok(())
        })
    });
    router.get("/").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.text("Hello from worker-router", ResponseInit::new());
            Ok(())
        })
    });
    router.get("/users/:userId").handle(|ctx, _next| {
        Box::pin(async move {
            let body = json!({ "id": ctx.param("userId") });
            ctx.json(&body, ResponseInit::new())?;
            Ok(())
        })
    });
    if let Err(err) = router.mount("/users/:userId/books", &books) {
        tracing::error!(error = %err, "Failed to mount books router");
    }
    router
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;
    tracing::info!("worker-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        case_sensitive = config.router.case_sensitive,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let router = demo_router(config.router);
    tracing::info!(routes = router.routes().len(), "Routes registered");

    HttpServer::new(router, config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
