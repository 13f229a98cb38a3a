//! Helper utilities to launch the bridgescope API server.

use std::{net::SocketAddr, sync::Arc};

use api::ApiState;
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use eyre::Result;
use runtime::{health, shutdown::ShutdownSignal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};

/// Version prefix for all API routes.
pub const API_VERSION: &str = "v1";

fn origin_allowed(allowed: &[String], origin: &HeaderValue) -> bool {
    match origin.to_str() {
        Ok(origin) => {
            allowed.iter().any(|o| o == origin) ||
                origin.starts_with("http://localhost:") ||
                origin.starts_with("http://127.0.0.1:")
        }
        Err(_) => false,
    }
}

/// Build the API router with CORS and tracing layers.
pub fn router(state: ApiState, allowed_origins: Vec<String>) -> Router {
    let allowed = Arc::new(allowed_origins);
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin_allowed(&allowed, origin)
        }))
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .expose_headers(Any);
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health::handler))
        .nest_service(&format!("/{API_VERSION}"), api::router(state))
        .layer(cors)
        .layer(trace)
}

/// Run the API server on the given address until SIGINT or SIGTERM.
pub async fn run(addr: SocketAddr, state: ApiState, allowed_origins: Vec<String>) -> Result<()> {
    let app = router(state, allowed_origins);
    let shutdown = ShutdownSignal::new()?;

    info!(%addr, "Starting API server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).with_graceful_shutdown(shutdown).await?;
    info!("API server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use clickhouse::test::{Mock, handlers};
    use clickhouse_lib::{ClickhouseReader, Datastores, TotalRow};
    use serde_json::{Value, json};
    use tower::util::ServiceExt;
    use url::Url;

    fn default_origins() -> Vec<String> {
        config::DEFAULT_ALLOWED_ORIGINS.split(',').map(ToOwned::to_owned).collect()
    }

    fn build_app(mock_url: &str, allowed: Vec<String>) -> Router {
        let reader = |db: &str| {
            let url = Url::parse(mock_url).unwrap();
            ClickhouseReader::new(url, db.to_owned(), "user".into(), "pass".into()).unwrap()
        };
        let state =
            ApiState::new(Datastores::new(reader("relayer"), reader("indexer")), "bitcoin|4".into());
        router(state, allowed)
    }

    async fn send_request(
        app: Router,
        uri: &str,
        origin: &str,
    ) -> (StatusCode, Value, Option<String>) {
        let response = app
            .oneshot(
                Request::builder().uri(uri).header("Origin", origin).body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let cors = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        (status, body, cors)
    }

    #[tokio::test]
    async fn health_needs_no_datastore() {
        let mock = Mock::new();
        let app = build_app(mock.url(), default_origins());
        let (status, body, _) = send_request(app, "/health", "https://bridgescope.xyz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn api_is_served_under_version_prefix() {
        let mock = Mock::new();
        for _ in 0..3 {
            mock.add(handlers::provide(vec![TotalRow { total: 3 }]));
        }
        let app = build_app(mock.url(), default_origins());
        let (status, body, cors) =
            send_request(app, "/v1/stats/summary", "https://testnet.bridgescope.xyz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "total_txs": 3, "total_volumes": 3, "total_users": 3 }));
        assert_eq!(cors.as_deref(), Some("https://testnet.bridgescope.xyz"));
    }

    #[tokio::test]
    async fn unversioned_api_path_is_not_found() {
        let mock = Mock::new();
        let app = build_app(mock.url(), default_origins());
        let response = app
            .oneshot(Request::builder().uri("/stats/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn allows_extra_origin() {
        let mock = Mock::new();
        let mut origins = default_origins();
        origins.push("https://example.com".to_owned());
        let app = build_app(mock.url(), origins);
        let (_, _, cors) = send_request(app, "/health", "https://example.com").await;
        assert_eq!(cors.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn allows_local_development_origins() {
        let mock = Mock::new();
        for origin in ["http://localhost:5173", "http://127.0.0.1:3001"] {
            let app = build_app(mock.url(), default_origins());
            let (status, _, cors) = send_request(app, "/health", origin).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(cors.as_deref(), Some(origin));
        }
    }

    #[tokio::test]
    async fn denies_other_origin() {
        let mock = Mock::new();
        let app = build_app(mock.url(), default_origins());
        let (status, _, cors) = send_request(app, "/health", "https://notallowed.com").await;
        assert_eq!(status, StatusCode::OK);
        assert!(cors.is_none());
    }

    #[test]
    fn origin_matching_is_exact() {
        let allowed = default_origins();
        assert!(origin_allowed(&allowed, &HeaderValue::from_static("https://bridgescope.xyz")));
        assert!(!origin_allowed(
            &allowed,
            &HeaderValue::from_static("https://bridgescope.xyz.evil.com")
        ));
        assert!(!origin_allowed(&allowed, &HeaderValue::from_static("http://localhost")));
    }
}
