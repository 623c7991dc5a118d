//! Personal checklist endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use checkflow_core::{Checklist, ChecklistEdit, ContentEdit, Lineage, NewChecklist};
use checkflow_storage::LineageDetail;

use crate::api_error::ApiError;
use crate::api_types::{ChecklistCreatedResponse, LineageDeleteResponse, VersionDeleteResponse};
use crate::auth::actor_from_headers;
use crate::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<NewChecklist>,
) -> Result<(StatusCode, Json<ChecklistCreatedResponse>), ApiError> {
    let actor = actor_from_headers(&headers)?;
    let created = state.checklists.create(actor, &input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Lineage>>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.checklists.list(actor).await?))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<LineageDetail>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.checklists.detail(actor, id).await?))
}

pub async fn create_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(edit): Json<ChecklistEdit>,
) -> Result<(StatusCode, Json<ChecklistCreatedResponse>), ApiError> {
    let actor = actor_from_headers(&headers)?;
    let created = state.checklists.create_version(actor, id, &edit).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_content(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(edit): Json<ContentEdit>,
) -> Result<Json<Checklist>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.checklists.update_content(actor, id, &edit).await?))
}

pub async fn delete_version(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<VersionDeleteResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    state.checklists.delete_version(actor, id).await?;
    Ok(Json(VersionDeleteResponse { deleted: true, id }))
}

pub async fn delete_lineage(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<LineageDeleteResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let deleted_versions = state.checklists.delete_lineage(actor, id).await?;
    Ok(Json(LineageDeleteResponse { deleted_versions }))
}

/// Move a draft into the moderation queue.
pub async fn share(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Checklist>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.reviews.submit(actor, id).await?))
}
