//! Moderation queue endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use checkflow_core::Checklist;

use crate::api_error::ApiError;
use crate::api_types::{ReviewDecisionResponse, ReviewRequest};
use crate::auth::actor_from_headers;
use crate::AppState;

pub async fn pending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Checklist>>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.reviews.pending(actor).await?))
}

pub async fn decide(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewDecisionResponse>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let outcome = state
        .reviews
        .decide(actor, req.checklist_id, &req.action, req.comment.as_deref())
        .await?;
    Ok(Json(outcome.into()))
}
