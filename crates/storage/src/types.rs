//! Storage types shared across modules

use std::collections::HashMap;

use checkflow_core::{Checklist, Question};
use serde::Serialize;

/// A checklist version created together with its question tree.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedChecklist {
    pub checklist: Checklist,
    /// Client temp id → durable question id, so callers can reconcile local
    /// state without refetching. Empty when the tree was carried forward.
    pub temp_ids: HashMap<String, i64>,
}

/// One checklist version plus its questions.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistWithQuestions {
    pub checklist: Checklist,
    pub questions: Vec<Question>,
}

/// Latest version of a lineage plus the version index.
#[derive(Debug, Clone, Serialize)]
pub struct LineageDetail {
    pub latest: Checklist,
    pub questions: Vec<Question>,
    /// Every version of the lineage, newest first.
    pub versions: Vec<VersionRef>,
}

/// One entry of a lineage's version index.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VersionRef {
    pub id: i64,
    pub version: i32,
}

/// Outcome of a review decision.
#[derive(Debug, Clone, Serialize)]
pub enum ReviewOutcome {
    /// The reviewed row, stamped approved, and the platform copy created
    /// from it in the same transaction.
    Approved { reviewed: Checklist, catalog: Checklist },
    /// The reviewed row, stamped rejected.
    Rejected { reviewed: Checklist },
}

impl ReviewOutcome {
    /// The personal row the decision was applied to.
    #[must_use]
    pub const fn reviewed(&self) -> &Checklist {
        match self {
            Self::Approved { reviewed, .. } | Self::Rejected { reviewed } => reviewed,
        }
    }

    /// The platform copy, present only for approvals.
    #[must_use]
    pub const fn catalog(&self) -> Option<&Checklist> {
        match self {
            Self::Approved { catalog, .. } => Some(catalog),
            Self::Rejected { .. } => None,
        }
    }
}
