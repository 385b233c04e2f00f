//! HTTP presentation layer — Axum server for the dashboard.
//!
//! Serves a self-contained HTML page and a small JSON API.
//! CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// The embedded dashboard HTML (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Run the web server until shutdown.
pub async fn run_server(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "CITY PULSE serving on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("Server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/snapshot", get(routes::get_snapshot))
        .route("/api/chat", post(routes::post_chat))
        .route("/health", get(routes::health))
        .route("/", get(serve_dashboard))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML dashboard.
async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::chatbot::ChatBot;
    use crate::config::AppConfig;
    use crate::providers::search::WebSearchClient;
    use crate::snapshot::SnapshotBuilder;
    use super::routes::ServerState;

    /// A fully keyless state: every provider fails with an auth error and
    /// no handler reaches the network.
    fn test_state() -> AppState {
        let toml = r#"
            [server]
            port = 0
            [providers]
            [providers.openweather]
            api_key_env = "CITYPULSE_TEST_UNSET_1"
            [providers.visualcrossing]
            api_key_env = "CITYPULSE_TEST_UNSET_2"
            [providers.google_places]
            api_key_env = "CITYPULSE_TEST_UNSET_3"
            [providers.news]
            api_key_env = "CITYPULSE_TEST_UNSET_4"
            [providers.search]
            api_key_env = "CITYPULSE_TEST_UNSET_5"
            cse_id_env = "CITYPULSE_TEST_UNSET_6"
        "#;
        let cfg: AppConfig = toml::from_str(toml).unwrap();
        let chatbot = ChatBot::new(
            WebSearchClient::new(None, None, cfg.request_timeout()).unwrap(),
        );
        Arc::new(ServerState {
            snapshots: SnapshotBuilder::from_config(&cfg).unwrap(),
            chatbot,
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dashboard_html() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("CITY PULSE"));
    }

    #[tokio::test]
    async fn test_snapshot_missing_city_is_400() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/api/snapshot").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("city"));
    }

    #[tokio::test]
    async fn test_snapshot_blank_city_is_400() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/snapshot?city=%20%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_empty_query_is_400() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query": "  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_keyless_search_is_502() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"query": "top cafes", "city": "Pune"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
