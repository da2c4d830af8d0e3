// HTTP routes
pub mod page_info;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::features::audit_log::AuditLog;
use crate::features::resolver::PageInfoResolver;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PageInfoResolver>,
    pub audit: AuditLog,
}

/// Build the router with all endpoints
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/facebook-page",
            post(page_info::resolve_page).fallback(page_info::method_not_allowed),
        )
        .with_state(state)
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::audit_log::AuditFiles;
    use crate::models::attempt_log::ResolutionAttemptLog;
    use crate::utils::config::{Config, Environment};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/facebook-page")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "198.51.100.7")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn state(config: Config, log_dir: &std::path::Path) -> (AppState, tokio::task::JoinHandle<()>) {
        let resolver = PageInfoResolver::new(Arc::new(config)).unwrap();
        let (audit, handle) = AuditLog::spawn(log_dir, 16);
        (
            AppState {
                resolver: Arc::new(resolver),
                audit,
            },
            handle,
        )
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(Config::default(), dir.path());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = call(router(state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_dev_stub_and_audit_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.environment = Environment::Development;
        let (state, handle) = state(config, dir.path());

        let (status, body) =
            call(router(state), post_json(r#"{"facebookUrl":"https://www.facebook.com/nike"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Nike");
        assert_eq!(body["data"]["method"], "graph_api_test");
        assert!(body.get("method").is_none());

        handle.await.unwrap();
        let content = std::fs::read_to_string(AuditFiles::new(dir.path()).json_path()).unwrap();
        let entries: Vec<ResolutionAttemptLog> = serde_json::from_str(&content).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].success);
        assert_eq!(entries[0].method, "graph_api_test");
        assert_eq!(entries[0].ip, "198.51.100.7");
    }

    #[tokio::test]
    async fn test_exhausted_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let (state, handle) = state(Config::default(), dir.path());

        let (status, body) =
            call(router(state), post_json(r#"{"facebookUrl":"https://example.com/about"}"#)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("Graph API: "));
        assert!(error.contains("URL parsing: "));

        handle.await.unwrap();
        let csv = std::fs::read_to_string(AuditFiles::new(dir.path()).csv_path()).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",FAILED,"));
    }

    #[tokio::test]
    async fn test_domain_fallback_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s2/favicons"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.endpoints.favicon_service = format!("{}/s2/favicons", server.uri());
        let (state, _) = state(config, dir.path());

        let (status, body) = call(
            router(state),
            post_json(r#"{"facebookUrl":"https://example.com/about","websiteUrl":"https://www.Example.org"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["method"], "domain_fallback");
        assert_eq!(body["data"]["name"], "Example");
        assert!(!body["data"]["fallback_reason"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(Config::default(), dir.path());
        let app = router(state);

        let (status, body) = call(app.clone(), post_json("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON payload");

        let (status, body) = call(app.clone(), post_json("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Facebook URL is required");

        let request = Request::builder()
            .method("GET")
            .uri("/api/facebook-page")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }
}
