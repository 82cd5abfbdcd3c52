//! Authentication API handlers (local credentials and OAuth2 social login)

use crate::config::OAuth2ProviderConfig;
use crate::domain::{LoginInput, SignupInput, TokenResponse, UserDto};
use crate::error::{AppError, Result};
use crate::oauth2::{build_authorize_url, OAuth2Client};
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tracing::warn;

#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignupInput,
    responses(
        (status = 201, description = "User registered", body = UserDto),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed")
    )
)]
/// Register a local account
pub async fn signup<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service().signup(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Access token", body = TokenResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
/// Log in with email and password
pub async fn login<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<LoginInput>,
) -> Result<Json<TokenResponse>> {
    Ok(Json(state.auth_service().login(input).await?))
}

fn lookup_provider<'a, S: HasServices>(
    state: &'a S,
    provider: &str,
) -> Result<&'a OAuth2ProviderConfig> {
    state
        .config()
        .oauth2
        .provider(provider)
        .ok_or_else(|| AppError::NotFound(format!("Unknown OAuth2 provider: {}", provider)))
}

#[utoipa::path(
    get,
    path = "/auth/oauth2/{provider}/authorize",
    tag = "Auth",
    params(("provider" = String, Path, description = "Registration id, e.g. google or kakao")),
    responses(
        (status = 307, description = "Redirect to the provider's consent page"),
        (status = 404, description = "Unknown provider")
    )
)]
/// Start an OAuth2 login
pub async fn oauth2_authorize<S: HasServices>(
    State(state): State<S>,
    Path(provider): Path<String>,
) -> Result<Response> {
    let provider_config = lookup_provider(&state, &provider)?;
    let oauth_state = state
        .jwt_manager()
        .create_oauth2_state(&provider_config.registration_id)?;
    let url = build_authorize_url(provider_config, &oauth_state)?;

    Ok(Redirect::temporary(&url).into_response())
}

/// Query string the provider redirects back with
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/auth/oauth2/{provider}/callback",
    tag = "Auth",
    params(
        ("provider" = String, Path, description = "Registration id"),
        ("code" = String, Query, description = "Authorization code"),
        ("state" = String, Query, description = "State issued by the authorize endpoint")
    ),
    responses(
        (status = 200, description = "Access token", body = TokenResponse),
        (status = 400, description = "Missing code or invalid state"),
        (status = 404, description = "Unknown provider"),
        (status = 502, description = "Provider error")
    )
)]
/// Complete an OAuth2 login
pub async fn oauth2_callback<S: HasServices>(
    State(state): State<S>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<TokenResponse>> {
    let provider_config = lookup_provider(&state, &provider)?;

    if let Some(error) = query.error {
        warn!(provider = %provider_config.registration_id, error = %error, "OAuth2 provider returned an error");
        return Err(AppError::BadRequest(format!("OAuth2 login failed: {}", error)));
    }

    let oauth_state = query
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing state".to_string()))?;
    state
        .jwt_manager()
        .verify_oauth2_state(&oauth_state, &provider_config.registration_id)?;

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let user_info = state
        .oauth2_client()
        .fetch_user_info(provider_config, &code)
        .await?;
    let principal = state
        .auth_service()
        .load_oauth2_user(&provider_config.registration_id, user_info)
        .await?;

    Ok(Json(state.auth_service().issue_token(&principal)?))
}
