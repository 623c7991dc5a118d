//! Request and response bodies for the JSON API.
//!
//! Domain types from `checkflow_core` and `checkflow_storage` serialize
//! directly; only shapes specific to the HTTP surface live here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use checkflow_core::ReviewStatus;
use checkflow_storage::{CreatedChecklist, ReviewOutcome};

/// Body of `POST /api/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub checklist_id: i64,
    /// `"approve"` or `"reject"`; anything else is a 400.
    pub action: String,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistCreatedResponse {
    pub checklist_id: i64,
    pub version: i32,
    /// Author-local temp ids mapped to the durable question ids, so the
    /// client can rebind its tree without refetching.
    pub temp_ids: HashMap<String, i64>,
}

impl From<CreatedChecklist> for ChecklistCreatedResponse {
    fn from(created: CreatedChecklist) -> Self {
        Self {
            checklist_id: created.checklist.id,
            version: created.checklist.version,
            temp_ids: created.temp_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewDecisionResponse {
    pub checklist_id: i64,
    pub status: Option<ReviewStatus>,
    /// Platform copy created by an approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<i64>,
}

impl From<ReviewOutcome> for ReviewDecisionResponse {
    fn from(outcome: ReviewOutcome) -> Self {
        Self {
            checklist_id: outcome.reviewed().id,
            status: outcome.reviewed().status,
            catalog_id: outcome.catalog().map(|c| c.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionDeleteResponse {
    pub deleted: bool,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct LineageDeleteResponse {
    pub deleted_versions: usize,
}
