//! The axum adapter: status mapping, request IDs, and a real listener.

mod common;

use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use common::{request, spawn_server};
use worker_router::config::ServerConfig;
use worker_router::http::{RequestId, X_REQUEST_ID};
use worker_router::{HttpServer, ResponseInit, RouteError, Router};

fn app_router() -> Router {
    let mut router = Router::new();
    router.get("/hello/:name").handle(|ctx, _next| {
        Box::pin(async move {
            let greeting = format!("hello {}", ctx.param("name").unwrap_or_default());
            ctx.end(greeting, ResponseInit::new().status(StatusCode::CREATED));
            Ok(())
        })
    });
    router.get("/request-id").handle(|ctx, _next| {
        Box::pin(async move {
            let id = ctx.data().get::<RequestId>().map(|id| id.0.clone()).unwrap_or_default();
            ctx.text(id, ResponseInit::new());
            Ok(())
        })
    });
    router.get("/boom").handle(|_ctx, _next| {
        Box::pin(async move { Err(RouteError::handler("kaboom")) })
    });
    router
}

fn debug_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.router.debug_errors = true;
    config
}

#[tokio::test]
async fn test_handled_request_keeps_status_and_body() {
    let app = HttpServer::new(app_router(), ServerConfig::default()).into_router();

    let response = app.oneshot(request(Method::GET, "/hello/ada")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key(X_REQUEST_ID));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"hello ada");
}

#[tokio::test]
async fn test_no_match_is_404() {
    let app = HttpServer::new(app_router(), ServerConfig::default()).into_router();

    let response = app.oneshot(request(Method::GET, "/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_is_500_without_details_by_default() {
    let app = HttpServer::new(app_router(), ServerConfig::default()).into_router();

    let response = app.oneshot(request(Method::GET, "/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Internal Server Error");
}

#[tokio::test]
async fn test_error_details_with_debug_errors() {
    let app = HttpServer::new(app_router(), debug_config()).into_router();

    let response = app.oneshot(request(Method::GET, "/boom")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"handler failed: kaboom");
}

#[tokio::test]
async fn test_client_request_id_reaches_actions() {
    let app = HttpServer::new(app_router(), ServerConfig::default()).into_router();

    let req = Request::builder()
        .uri("/request-id")
        .header(X_REQUEST_ID, "req-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.headers().get(X_REQUEST_ID).unwrap(), "req-123");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"req-123");
}

#[tokio::test]
async fn test_end_to_end_over_tcp() {
    let addr = spawn_server(app_router(), ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/hello/grace"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    assert!(response.headers().get(X_REQUEST_ID).is_some());
    assert_eq!(response.text().await.unwrap(), "hello grace");

    let response = client.get(format!("http://{addr}/nope")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client.post(format!("http://{addr}/hello/grace")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_slow_dispatch_times_out_with_408() {
    let mut router = Router::new();
    router.get("/slow").handle(|ctx, _next| {
        Box::pin(async move {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            ctx.text("late", ResponseInit::new());
            Ok(())
        })
    });
    let mut config = ServerConfig::default();
    config.timeouts.request_secs = 1;
    let app = HttpServer::new(router, config).into_router();

    let response = app.oneshot(request(Method::GET, "/slow")).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}
