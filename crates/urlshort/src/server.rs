//! Axum HTTP server: fallback router, listener, graceful shutdown.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::dispatcher::RedirectDispatcher;
use crate::resolver::MapResolver;

/// Routes served when no redirect applies.
///
/// Mapped paths are checked first, so a mapping for `/health` shadows the
/// health check.
pub fn fallback_router(mapped_paths: usize) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .with_state(mapped_paths)
}

/// The full application: redirect dispatcher in front of [`fallback_router`].
pub fn app(resolver: MapResolver) -> Router {
    let fallback = fallback_router(resolver.len());
    let dispatcher = RedirectDispatcher::new(resolver, fallback);

    Router::new()
        .fallback_service(dispatcher)
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener and serve until Ctrl+C.
pub async fn run(config: &ServerConfig, resolver: MapResolver) -> anyhow::Result<()> {
    let listen_addr = config.listen_address.clone();
    let app = app(resolver);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "urlshort listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("urlshort shut down gracefully");
    Ok(())
}

/// Health check endpoint.
async fn handle_health(State(mapped_paths): State<usize>) -> Response {
    axum::Json(serde_json::json!({ "status": "ok", "paths": mapped_paths })).into_response()
}

async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a handler there is nothing to wait for; keep serving.
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{header, Method};
    use tower::ServiceExt;

    use super::*;
    use crate::loader::load_yaml;

    fn request(method: Method, uri: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn sample_app() -> Router {
        let resolver = load_yaml(
            b"- path: /google\n  url: https://www.google.com\n- path: /amazon\n  url: \"\"\n",
        )
        .unwrap();
        app(resolver)
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let app = sample_app();

        let response = app.clone().oneshot(request(Method::GET, "/google")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://www.google.com");

        let response = app.clone().oneshot(request(Method::GET, "/amazon")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(request(Method::GET, "/unknown")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_redirect_ignores_method() {
        let response = sample_app()
            .oneshot(request(Method::POST, "/google"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_health_reports_path_count() {
        let response = sample_app()
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok", "paths": 2 }));
    }

    #[tokio::test]
    async fn test_mapping_shadows_health() {
        let resolver = load_yaml(b"- path: /health\n  url: https://status.example\n").unwrap();

        let response = app(resolver)
            .oneshot(request(Method::GET, "/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://status.example");
    }

    #[tokio::test]
    async fn test_empty_mapping_serves_fallback_only() {
        let app = app(MapResolver::default());

        let response = app.clone().oneshot(request(Method::GET, "/anything")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(request(Method::GET, "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
