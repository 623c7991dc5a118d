//! Storage trait abstraction
//!
//! Async domain traits implemented by [`PgStorage`](crate::PgStorage) and by
//! the in-memory double in the service tests. Inputs are assumed to have
//! passed `checkflow_core` validation; implementations only enforce state
//! and existence rules.

use async_trait::async_trait;
use checkflow_core::{
    Checklist, ChecklistEdit, ChecklistKind, ContentEdit, NewChecklist, Question, ReviewAction,
};

use crate::types::{ChecklistWithQuestions, CreatedChecklist, LineageDetail, ReviewOutcome};
use crate::StorageError;

/// Checklist authoring, versioning, and lineage reads.
#[async_trait]
pub trait ChecklistStore: Send + Sync {
    /// Create a personal checklist and its question tree in one transaction.
    async fn create_checklist(
        &self,
        owner_id: i64,
        input: &NewChecklist,
    ) -> Result<CreatedChecklist, StorageError>;

    /// Create the next version of a lineage. The base is the highest version
    /// pointing at `checklist_id`, falling back to that row itself; header
    /// fields are copied from the base, and the tree is rebuilt from the
    /// edit or carried forward when the edit omits questions.
    async fn create_version(
        &self,
        checklist_id: i64,
        edit: &ChecklistEdit,
    ) -> Result<CreatedChecklist, StorageError>;

    /// In-place content edit. Never touches versioning or tree structure.
    /// Fails with `Conflict` while the row is under review.
    async fn update_content(
        &self,
        checklist_id: i64,
        edit: &ContentEdit,
    ) -> Result<Checklist, StorageError>;

    /// Get one checklist version by id.
    async fn get_checklist(&self, id: i64) -> Result<Option<Checklist>, StorageError>;

    /// Questions of one version, in creation order.
    async fn get_questions(&self, checklist_id: i64) -> Result<Vec<Question>, StorageError>;

    /// Latest version of the lineage containing `id`, with its questions
    /// and the full version index.
    async fn lineage_detail(&self, id: i64) -> Result<LineageDetail, StorageError>;

    /// All rows of a kind, newest first, optionally filtered by owner.
    async fn list_checklists(
        &self,
        kind: ChecklistKind,
        owner_id: Option<i64>,
    ) -> Result<Vec<Checklist>, StorageError>;

    /// Delete one version and its questions. Refuses to delete a lineage
    /// root that still has later versions.
    async fn delete_version(&self, id: i64) -> Result<(), StorageError>;

    /// Delete a whole lineage by root id. Returns the number of versions
    /// removed.
    async fn delete_lineage(&self, root_id: i64) -> Result<usize, StorageError>;
}

/// Moderation lifecycle operations.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Move a draft into review. Conflict when the row is in any other
    /// state.
    async fn submit_for_review(&self, checklist_id: i64) -> Result<Checklist, StorageError>;

    /// Decide a review under an exclusive row lock. Approval copies the
    /// reviewed question tree into the platform catalog inside the same
    /// transaction; the loser of a concurrent decision gets `NotFound`.
    async fn decide_review(
        &self,
        checklist_id: i64,
        action: ReviewAction,
        comment: Option<&str>,
        reviewer_id: i64,
    ) -> Result<ReviewOutcome, StorageError>;

    /// Personal checklists currently awaiting review, oldest first.
    async fn list_in_review(&self) -> Result<Vec<Checklist>, StorageError>;
}

/// Platform-catalog bridge operations.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Deep-copy the current version of a platform lineage into a new
    /// personal draft owned by `owner_id`, remapping all internal
    /// references. Any version id addresses the lineage; `adopted_from`
    /// records its root.
    async fn adopt_checklist(
        &self,
        catalog_id: i64,
        owner_id: i64,
    ) -> Result<ChecklistWithQuestions, StorageError>;
}

/// Everything a service needs, as one object-safe surface.
pub trait Store: ChecklistStore + ReviewStore + CatalogStore {}

impl<T: ChecklistStore + ReviewStore + CatalogStore> Store for T {}
