//! Error response normalization middleware
//!
//! Framework rejections (bad path id, malformed JSON body, missing query
//! parameters, unknown route) come back from axum as `text/plain` with parser
//! details. This layer rewrites them into the same `{error, message}` body
//! `AppError` produces.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Replace non-JSON 4xx/5xx bodies with a generic JSON error
pub async fn normalize_error_response(request: Request<Body>, next: Next) -> Response {
    let uri = request.uri().path().to_string();
    let response = next.run(request).await;

    let status = response.status();

    // Readiness answers with its own plain-text body
    if uri == "/ready" {
        return response;
    }

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    if is_json {
        return response;
    }

    generic_error_response(status)
}

fn generic_error_response(status: StatusCode) -> Response {
    let (error_type, message) = match status {
        StatusCode::BAD_REQUEST => ("bad_request", "Invalid request"),
        StatusCode::UNAUTHORIZED => ("unauthorized", "Authentication required"),
        StatusCode::NOT_FOUND => ("not_found", "Not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("method_not_allowed", "Method not allowed"),
        StatusCode::CONFLICT => ("conflict", "Resource conflict"),
        StatusCode::UNPROCESSABLE_ENTITY => ("validation", "Invalid request body"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ("unsupported_media_type", "Unsupported content type")
        }
        _ if status.is_client_error() => ("client_error", "Client error"),
        _ => ("internal_error", "An internal error occurred"),
    };

    let body = json!({
        "error": error_type,
        "message": message,
    });

    (status, axum::Json(body)).into_response()
}
