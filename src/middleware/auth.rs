//! JWT authentication extractor
//!
//! `AuthUser` validates the `Authorization: Bearer <jwt>` header and yields
//! the caller's identity to handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::domain::AuthProvider;
use crate::jwt::IdentityClaims;
use crate::state::HasServices;

/// Authenticated user information extracted from JWT token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// User ID from the token's `sub` claim
    pub user_id: i64,
    pub email: Option<String>,
    pub name: String,
    pub provider: AuthProvider,
}

impl AuthUser {
    /// Create AuthUser from identity token claims
    pub fn from_identity_claims(claims: IdentityClaims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;
        let provider = claims
            .provider
            .parse()
            .map_err(|_| AuthError::InvalidToken("Invalid provider in token".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            name: claims.name,
            provider,
        })
    }
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// No Authorization header present
    MissingToken,
    /// Invalid Authorization header format
    InvalidHeader(String),
    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidHeader(_) => "Invalid authorization header",
            AuthError::InvalidToken(_) => "Invalid or expired token",
        };

        let body = serde_json::json!({
            "error": message,
            "code": "UNAUTHORIZED"
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Extract the Bearer token from the Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AuthError::InvalidHeader("Authorization header must use Bearer scheme".to_string())
        })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasServices + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state
            .jwt_manager()
            .verify_identity_token(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        AuthUser::from_identity_claims(claims)
    }
}
