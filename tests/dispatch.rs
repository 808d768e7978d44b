//! End-to-end dispatch through `Router` without a network listener.

mod common;

use axum::http::{header, Extensions, HeaderValue, Method, StatusCode};
use common::{recorder, request, History};
use worker_router::{Response, ResponseInit, RouteError, Router};

/// The layered table used by the ordering tests.
fn layered_router(history: &History) -> Router {
    let mut router = Router::new();
    router.all("(.*)").action(recorder(history, "all-*"));

    let h = history.clone();
    router.get("/users/:userId").middleware(move |ctx, next| {
        let h = h.clone();
        Box::pin(async move {
            assert_eq!(ctx.params().len(), 1);
            let id = ctx.param("userId").unwrap_or_default().to_string();
            h.push(format!("get-userId-middleware-{id}"));
            next.run(ctx).await?;
            h.push(format!("get-userId-after-middleware-{}", ctx.param("userId").unwrap_or_default()));
            Ok(())
        })
    });

    let h1 = history.clone();
    let h2 = history.clone();
    let h3 = history.clone();
    router
        .get("/users/:id")
        .middleware(move |ctx, next| {
            let h = h1.clone();
            Box::pin(async move {
                if ctx.param("id") == Some("bail-early") {
                    ctx.text("whoa", ResponseInit::new());
                    return Ok(());
                }
                let id = ctx.param("id").unwrap_or_default().to_string();
                h.push(format!("get-user-middleware-{id}"));
                next.run(ctx).await?;
                h.push(format!("get-user-after-middleware-{id}"));
                Ok(())
            })
        })
        .middleware(move |ctx, next| {
            let h = h2.clone();
            Box::pin(async move {
                let id = ctx.param("id").unwrap_or_default().to_string();
                h.push(format!("get-user-2-middleware-{id}"));
                next.run(ctx).await?;
                h.push(format!("get-user-2-after-middleware-{id}"));
                Ok(())
            })
        })
        .handle(move |ctx, _next| {
            let h = h3.clone();
            Box::pin(async move {
                assert_ne!(ctx.param("id"), Some("bail-early"));
                h.push(format!("responding-{}", ctx.param("id").unwrap_or_default()));
                ctx.text("hi", ResponseInit::new());
                Ok(())
            })
        });

    let h = history.clone();
    router.get("/users/:id").handle(move |_ctx, _next| {
        let h = h.clone();
        Box::pin(async move {
            h.push("unreachable-handler");
            Ok(())
        })
    });
    router
}

#[tokio::test]
async fn test_middleware_runs_in_onion_order() {
    let history = History::default();
    let router = layered_router(&history);

    let response = router
        .dispatch(request(Method::GET, "/users/123"))
        .await
        .unwrap()
        .expect("a response");

    assert_eq!(response.text(), Some("hi"));
    assert_eq!(
        history.events(),
        vec![
            "all-*",
            "get-userId-middleware-123",
            "get-user-middleware-123",
            "get-user-2-middleware-123",
            "responding-123",
            "get-user-2-after-middleware-123",
            "get-user-after-middleware-123",
            "get-userId-after-middleware-123",
            "all-*-after",
        ]
    );
}

#[tokio::test]
async fn test_short_circuit_skips_the_rest_of_the_stack() {
    let history = History::default();
    let router = layered_router(&history);

    let response = router
        .dispatch(request(Method::GET, "/users/bail-early"))
        .await
        .unwrap()
        .expect("a response");

    assert_eq!(response.text(), Some("whoa"));
    assert_eq!(
        history.events(),
        vec![
            "all-*",
            "get-userId-middleware-bail-early",
            "get-userId-after-middleware-bail-early",
            "all-*-after",
        ]
    );
}

#[tokio::test]
async fn test_catch_all_handles_unmatched_paths() {
    let history = History::default();
    let mut router = layered_router(&history);
    router.all("(.*)").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.end("Not found", StatusCode::NOT_FOUND.into());
            Ok(())
        })
    });

    let response = router
        .dispatch(request(Method::GET, "/no-route"))
        .await
        .unwrap()
        .expect("a response");

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.text(), Some("Not found"));
}

#[tokio::test]
async fn test_no_match_yields_none() {
    let mut router = Router::new();
    router.get("/users/:id").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.text("user", ResponseInit::new());
            Ok(())
        })
    });

    assert!(router.dispatch(request(Method::GET, "/teams/1")).await.unwrap().is_none());
    assert!(router.dispatch(request(Method::POST, "/users/1")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unfinalized_chain_yields_none() {
    let history = History::default();
    let mut router = Router::new();
    router.all("(.*)").action(recorder(&history, "only"));

    let result = router.dispatch(request(Method::GET, "/anything")).await.unwrap();
    assert!(result.is_none());
    assert_eq!(history.events(), vec!["only", "only-after"]);
}

#[tokio::test]
async fn test_handler_error_propagates() {
    let history = History::default();
    let mut router = Router::new();
    router.all("(.*)").action(recorder(&history, "outer"));
    router.get("/fail").handle(|_ctx, _next| {
        Box::pin(async move { Err(RouteError::handler("boom")) })
    });

    let err = router.dispatch(request(Method::GET, "/fail")).await.unwrap_err();
    assert!(matches!(err, RouteError::Handler(_)));
    assert_eq!(err.to_string(), "handler failed: boom");
    assert_eq!(history.events(), vec!["outer"]);
}

#[tokio::test]
async fn test_middleware_can_recover_from_errors() {
    let mut router = Router::new();
    router.all("(.*)").middleware(|ctx, next| {
        Box::pin(async move {
            if let Err(err) = next.run(ctx).await {
                let response = Response::new(err.to_string())
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                    .with_status_text("Internal Server Error");
                ctx.end(response, ResponseInit::new());
            }
            Ok(())
        })
    });
    router.get("/fail").handle(|_ctx, _next| {
        Box::pin(async move { Err(RouteError::handler("boom")) })
    });

    let response = router
        .dispatch(request(Method::GET, "/fail"))
        .await
        .unwrap()
        .expect("recovered response");
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.status_text.as_deref(), Some("Internal Server Error"));
    assert_eq!(response.text(), Some("handler failed: boom"));
}

#[tokio::test]
async fn test_double_next_surfaces_from_dispatch() {
    let mut router = Router::new();
    router.all("(.*)").middleware(|ctx, next| {
        Box::pin(async move {
            next.run(ctx).await?;
            next.run(ctx).await
        })
    });
    router.get("/").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.text("once", ResponseInit::new());
            Ok(())
        })
    });

    let err = router.dispatch(request(Method::GET, "/")).await.unwrap_err();
    assert!(err.is_double_continuation());
}

#[tokio::test]
async fn test_data_bag_is_shared_across_the_chain() {
    #[derive(Clone, Debug, PartialEq)]
    struct Tenant(&'static str);
    #[derive(Clone, Debug, PartialEq)]
    struct User(String);

    let mut router = Router::new();
    router.all("(.*)").middleware(|ctx, next| {
        Box::pin(async move {
            let user = User(format!("user-of-{}", ctx.data().get::<Tenant>().map(|t| t.0).unwrap_or("none")));
            ctx.data_mut().insert(user);
            next.run(ctx).await
        })
    });
    router.get("/me").handle(|ctx, _next| {
        Box::pin(async move {
            let name = ctx.data().get::<User>().map(|u| u.0.clone()).unwrap_or_default();
            ctx.text(name, ResponseInit::new());
            Ok(())
        })
    });

    let mut data = Extensions::new();
    data.insert(Tenant("acme"));
    let response = router
        .dispatch_with(request(Method::GET, "/me"), data)
        .await
        .unwrap()
        .expect("a response");
    assert_eq!(response.text(), Some("user-of-acme"));
}

#[tokio::test]
async fn test_outer_middleware_decorates_response_on_unwind() {
    let mut router = Router::new();
    router.all("(.*)").middleware(|ctx, next| {
        Box::pin(async move {
            next.run(ctx).await?;
            ctx.response_mut()
                .headers
                .insert("x-powered-by", HeaderValue::from_static("worker-router"));
            Ok(())
        })
    });
    router.get("/").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.html("<h1>home</h1>", ResponseInit::new().status(StatusCode::ACCEPTED));
            Ok(())
        })
    });

    let response = router
        .dispatch(request(Method::GET, "/"))
        .await
        .unwrap()
        .expect("a response");
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.headers.get("x-powered-by").unwrap(), "worker-router");
    assert_eq!(
        response.headers.get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
}

#[tokio::test]
async fn test_mounted_router_sees_all_params() {
    let mut books = Router::new();
    books.get("/:bookId").handle(|ctx, _next| {
        Box::pin(async move {
            let body = format!(
                "{}/{}",
                ctx.param("userId").unwrap_or_default(),
                ctx.param("bookId").unwrap_or_default()
            );
            ctx.text(body, ResponseInit::new());
            Ok(())
        })
    });

    let mut users = Router::new();
    users.mount("/users/:userId/books", &books).unwrap();

    let response = users
        .dispatch(request(Method::GET, "/users/42/books/7"))
        .await
        .unwrap()
        .expect("a response");
    assert_eq!(response.text(), Some("42/7"));
}

#[tokio::test]
async fn test_host_qualified_route_uses_host_header() {
    let mut router = Router::new();
    router.get("http://:tenant.example.com/(.*)").handle(|ctx, _next| {
        Box::pin(async move {
            let tenant = ctx.param("tenant").unwrap_or_default().to_string();
            ctx.text(tenant, ResponseInit::new());
            Ok(())
        })
    });

    let mut req = request(Method::GET, "/dashboard");
    req.headers_mut()
        .insert(header::HOST, HeaderValue::from_static("acme.example.com"));
    let response = router.dispatch(req).await.unwrap().expect("a response");
    assert_eq!(response.text(), Some("acme"));
}

#[tokio::test]
async fn test_host_header_cannot_redirect_routing() {
    let mut router = Router::new();
    router.get("/admin/users").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.text("admin", ResponseInit::new());
            Ok(())
        })
    });
    router.get("/users").handle(|ctx, _next| {
        Box::pin(async move {
            ctx.text("public", ResponseInit::new());
            Ok(())
        })
    });

    for host in ["x/admin", "x?", "bad host"] {
        let mut req = request(Method::GET, "/users");
        req.headers_mut()
            .insert(header::HOST, HeaderValue::from_str(host).unwrap());
        let response = router.dispatch(req).await.unwrap().expect("a response");
        assert_eq!(response.text(), Some("public"), "host {host:?}");
    }
}
