//! Caller identity from the fronting auth layer.
//!
//! Authentication itself happens upstream (gateway or reverse proxy); this
//! service only trusts two headers:
//!
//! ```text
//! x-actor-id: 42
//! x-actor-role: moderator
//! ```
//!
//! `x-actor-id` is required on every authenticated route and must parse as
//! an integer, otherwise the request is rejected with 401. `x-actor-role`
//! is optional; the value `moderator` (case-insensitive) grants moderation
//! rights, anything else means a regular user.

use axum::http::HeaderMap;
use checkflow_core::Actor;

use crate::api_error::ApiError;

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let id = headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::Unauthorized("valid x-actor-id header required".to_owned()))?;
    let moderator = headers
        .get("x-actor-role")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("moderator"));
    Ok(if moderator { Actor::moderator(id) } else { Actor::user(id) })
}
