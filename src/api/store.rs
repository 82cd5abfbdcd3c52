//! Store API handlers

use crate::domain::{NearbyQuery, StoreRequest, StoreResponse};
use crate::error::Result;
use crate::state::HasServices;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Stores",
    request_body = StoreRequest,
    responses(
        (status = 201, description = "Store created", body = StoreResponse)
    )
)]
/// Create store
pub async fn create<S: HasServices>(
    State(state): State<S>,
    Json(request): Json<StoreRequest>,
) -> Result<impl IntoResponse> {
    let store = state.store_service().create(request).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = i64, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store", body = StoreResponse),
        (status = 404, description = "Store not found")
    )
)]
/// Get store by ID
pub async fn get<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<Json<StoreResponse>> {
    Ok(Json(state.store_service().get(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Stores",
    responses(
        (status = 200, description = "All stores", body = [StoreResponse])
    )
)]
/// List stores
pub async fn list<S: HasServices>(State(state): State<S>) -> Result<Json<Vec<StoreResponse>>> {
    Ok(Json(state.store_service().get_all().await?))
}

#[utoipa::path(
    put,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = i64, Path, description = "Store ID")),
    request_body = StoreRequest,
    responses(
        (status = 200, description = "Store updated", body = StoreResponse),
        (status = 404, description = "Store not found")
    )
)]
/// Update store (full overwrite)
pub async fn update<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<i64>,
    Json(request): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    Ok(Json(state.store_service().update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = i64, Path, description = "Store ID")),
    responses(
        (status = 204, description = "Store deleted (or never existed)")
    )
)]
/// Delete store
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.store_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/stores/nearby",
    tag = "Stores",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Stores within the radius, nearest first", body = [StoreResponse]),
        (status = 400, description = "Invalid coordinates, radius or limit")
    )
)]
/// Find stores near a point
pub async fn nearby<S: HasServices>(
    State(state): State<S>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<StoreResponse>>> {
    Ok(Json(state.store_service().find_nearby(query).await?))
}
