//! Platform catalog endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use checkflow_core::{ChecklistEdit, Lineage};
use checkflow_storage::{ChecklistWithQuestions, LineageDetail};

use crate::api_error::ApiError;
use crate::api_types::{ChecklistCreatedResponse, LineageDeleteResponse, VersionDeleteResponse};
use crate::auth::actor_from_headers;
use crate::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Lineage>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<LineageDetail>, ApiError> {
    Ok(Json(state.catalog.detail(id).await?))
}

pub async fn create_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(edit): Json<ChecklistEdit>,
) -> Result<(StatusCode, Json<ChecklistCreatedResponse>), ApiError> {
    let actor = actor_from_headers(&headers)?;
    let created = state.catalog.create_version(actor, id, &edit).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn delete_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<VersionDeleteResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    state.catalog.delete_version(actor, id).await?;
    Ok(Json(VersionDeleteResponse { deleted: true, id }))
}

pub async fn delete_lineage(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<LineageDeleteResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let deleted_versions = state.catalog.delete_lineage(actor, id).await?;
    Ok(Json(LineageDeleteResponse { deleted_versions }))
}

/// Copy a catalog checklist into the caller's personal space as a new
/// draft.
pub async fn adopt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ChecklistWithQuestions>), ApiError> {
    let actor = actor_from_headers(&headers)?;
    let adopted = state.catalog.adopt(actor, id).await?;
    Ok((StatusCode::CREATED, Json(adopted)))
}
