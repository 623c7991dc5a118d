use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// One immutable checklist version.
///
/// A lineage is a flat star: the first version has `parent_id = None` and
/// every later version points directly at that root, never at the version it
/// was derived from. `version` numbers are 1-based and dense within a
/// lineage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: i64,
    pub kind: ChecklistKind,
    pub version: i32,
    pub parent_id: Option<i64>,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub diagram_source: Option<String>,
    /// Review state; `None` for platform rows, which sit outside moderation.
    pub status: Option<ReviewStatus>,
    pub review_comment: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_id: Option<i64>,
    /// Platform checklist this lineage was copied from, if any.
    pub adopted_from: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Checklist {
    /// Id of the lineage root this version belongs to.
    #[must_use]
    pub fn root_id(&self) -> i64 {
        self.parent_id.unwrap_or(self.id)
    }

    /// Whether this row is the first version of its lineage.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistKind {
    /// Authored and owned by a single user, subject to moderation.
    Personal,
    /// Published in the shared catalog, maintained by moderators.
    Platform,
}

impl ChecklistKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Platform => "platform",
        }
    }
}

impl std::str::FromStr for ChecklistKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "platform" => Ok(Self::Platform),
            _ => Err(ValidationError::new(format!("Invalid checklist kind: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Draft,
    Review,
    Approved,
    Rejected,
}

impl ReviewStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::new(format!("Invalid review status: {s}"))),
        }
    }
}

/// Decision a moderator can take on a checklist under review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl std::str::FromStr for ReviewAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            _ => Err(ValidationError::new(format!("Invalid review action: {s}"))),
        }
    }
}

/// A lineage grouped for listing: root plus its later versions.
#[derive(Debug, Clone, Serialize)]
pub struct Lineage {
    pub root: Checklist,
    /// Later versions, newest first. Empty for single-version lineages.
    pub versions: Vec<Checklist>,
}

/// Group checklist rows into lineages.
///
/// Roots keep their input order; versions within a lineage are sorted newest
/// first. Rows whose root is not part of the input are dropped.
#[must_use]
pub fn group_lineages(rows: Vec<Checklist>) -> Vec<Lineage> {
    let mut children: HashMap<i64, Vec<Checklist>> = HashMap::new();
    let mut roots = Vec::new();
    for row in rows {
        match row.parent_id {
            Some(root_id) => children.entry(root_id).or_default().push(row),
            None => roots.push(row),
        }
    }
    roots
        .into_iter()
        .map(|root| {
            let mut versions = children.remove(&root.id).unwrap_or_default();
            versions.sort_by(|a, b| b.version.cmp(&a.version));
            Lineage { root, versions }
        })
        .collect()
}
