//! Health, readiness and API document HTTP tests

use super::{build_test_router, get_json, get_raw, TestAppState};
use axum::http::StatusCode;
use catcheat_core::api::health::HealthResponse;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(TestAppState::new());

    let (status, body): (StatusCode, Option<HealthResponse>) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_is_public() {
    let app = build_test_router(TestAppState::new());

    let response = get_raw(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = build_test_router(TestAppState::new());

    let response = get_raw(&app, "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ready_endpoint_reports_unavailable_database() {
    let mut state = TestAppState::new();
    state.ready = false;
    let app = build_test_router(state);

    let response = get_raw(&app, "/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = build_test_router(TestAppState::new());

    let response = get_raw(&app, "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = build_test_router(TestAppState::new());

    let (status, doc): (StatusCode, Option<Value>) =
        get_json(&app, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc = doc.unwrap();
    assert_eq!(doc["info"]["title"], "CatchEat Core API");
    assert!(doc["paths"]["/api/stores/nearby"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_jwt"].is_object());
}
