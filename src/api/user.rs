//! Current-user endpoint

use crate::domain::UserDto;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::state::HasServices;
use axum::{extract::State, Json};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = UserDto),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// Get the authenticated user's profile
pub async fn me<S: HasServices>(State(state): State<S>, auth: AuthUser) -> Result<Json<UserDto>> {
    Ok(Json(state.auth_service().get_profile(auth.user_id).await?))
}
