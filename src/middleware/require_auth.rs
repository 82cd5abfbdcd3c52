//! Authentication enforcement middleware for REST API
//!
//! Rejects requests on protected route groups unless they carry a valid
//! identity token.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::auth::{extract_bearer_token, AuthError};
use crate::jwt::JwtManager;

/// Shared state for authentication middleware
#[derive(Clone)]
pub struct AuthMiddlewareState {
    jwt_manager: JwtManager,
}

impl AuthMiddlewareState {
    pub fn new(jwt_manager: JwtManager) -> Self {
        Self { jwt_manager }
    }
}

/// Authentication enforcement middleware
pub async fn require_auth_middleware(
    State(auth_state): State<AuthMiddlewareState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = auth_state.jwt_manager.verify_identity_token(token) {
        return AuthError::InvalidToken(e.to_string()).into_response();
    }

    next.run(request).await
}

/// State for the store write guard
#[derive(Clone)]
pub struct StoreWriteGuard {
    enabled: bool,
    auth: AuthMiddlewareState,
}

impl StoreWriteGuard {
    pub fn new(enabled: bool, jwt_manager: JwtManager) -> Self {
        Self {
            enabled,
            auth: AuthMiddlewareState::new(jwt_manager),
        }
    }
}

/// Require a bearer token on store writes when `STORE_WRITES_REQUIRE_AUTH` is set
pub async fn store_write_guard(
    State(guard): State<StoreWriteGuard>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !guard.enabled {
        return next.run(request).await;
    }
    require_auth_middleware(State(guard.auth), request, next).await
}
