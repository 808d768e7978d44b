//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::http::{Method, Request};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use worker_router::config::ServerConfig;
use worker_router::{from_fn, HttpServer, Router, SharedAction};

/// Ordered log of events recorded by test actions.
#[derive(Clone, Default)]
pub struct History(Arc<Mutex<Vec<String>>>);

impl History {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Middleware that records `{name}` on the way in and `{name}-after` on the way out.
pub fn recorder(history: &History, name: &'static str) -> SharedAction {
    let history = history.clone();
    from_fn(move |ctx, next| {
        let history = history.clone();
        Box::pin(async move {
            history.push(name);
            next.run(ctx).await?;
            history.push(format!("{name}-after"));
            Ok(())
        })
    })
}

/// Build a request with an empty body.
pub fn request(method: Method, uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

/// Serve `router` on an ephemeral port and return its address.
pub async fn spawn_server(router: Router, config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = HttpServer::new(router, config).into_router();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}
