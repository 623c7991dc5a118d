use std::sync::Arc;

use checkflow_core::{Actor, Checklist, ChecklistKind, ReviewAction};
use checkflow_storage::traits::Store;
use checkflow_storage::{ReviewOutcome, StorageError};

use crate::ServiceError;

/// Moderation workflow: submission, queue, and decisions.
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Submit the caller's draft for review.
    pub async fn submit(&self, actor: Actor, checklist_id: i64) -> Result<Checklist, ServiceError> {
        let checklist = self
            .store
            .get_checklist(checklist_id)
            .await?
            .filter(|c| c.kind == ChecklistKind::Personal)
            .ok_or(StorageError::not_found("checklist", checklist_id))?;
        if checklist.owner_id != actor.id {
            return Err(ServiceError::forbidden("checklist belongs to another user"));
        }
        Ok(self.store.submit_for_review(checklist_id).await?)
    }

    /// Checklists awaiting review, oldest first. Moderators only.
    pub async fn pending(&self, actor: Actor) -> Result<Vec<Checklist>, ServiceError> {
        require_moderator(actor)?;
        Ok(self.store.list_in_review().await?)
    }

    /// Decide a pending review. Moderators only; the action arrives as free
    /// text from the request body and is parsed strictly.
    pub async fn decide(
        &self,
        actor: Actor,
        checklist_id: i64,
        action: &str,
        comment: Option<&str>,
    ) -> Result<ReviewOutcome, ServiceError> {
        require_moderator(actor)?;
        let action: ReviewAction = action.parse()?;
        Ok(self.store.decide_review(checklist_id, action, comment, actor.id).await?)
    }
}

pub(crate) fn require_moderator(actor: Actor) -> Result<(), ServiceError> {
    if actor.moderator {
        Ok(())
    } else {
        tracing::debug!(actor_id = actor.id, "moderation denied");
        Err(ServiceError::forbidden("moderator role required"))
    }
}
