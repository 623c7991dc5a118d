use std::sync::Arc;

use checkflow_core::{
    group_lineages, validate_specs, Actor, Checklist, ChecklistEdit, ChecklistKind, ContentEdit,
    Lineage, NewChecklist,
};
use checkflow_storage::traits::Store;
use checkflow_storage::{CreatedChecklist, LineageDetail, StorageError};

use crate::ServiceError;

/// Authoring and lifecycle of personal checklists.
pub struct ChecklistService {
    store: Arc<dyn Store>,
}

impl ChecklistService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a personal checklist together with its question tree.
    pub async fn create(
        &self,
        actor: Actor,
        input: &NewChecklist,
    ) -> Result<CreatedChecklist, ServiceError> {
        if input.name.trim().is_empty() || input.questions.is_empty() {
            return Err(ServiceError::validation("Checklist name and questions are required"));
        }
        validate_specs(&input.questions)?;
        Ok(self.store.create_checklist(actor.id, input).await?)
    }

    /// The caller's checklists, grouped into lineages.
    pub async fn list(&self, actor: Actor) -> Result<Vec<Lineage>, ServiceError> {
        let rows =
            self.store.list_checklists(ChecklistKind::Personal, Some(actor.id)).await?;
        Ok(group_lineages(rows))
    }

    /// Latest version of the lineage containing `id`, with questions and the
    /// version index. Owners see their own; moderators see everything.
    pub async fn detail(&self, actor: Actor, id: i64) -> Result<LineageDetail, ServiceError> {
        let checklist = self.personal(id).await?;
        if checklist.owner_id != actor.id && !actor.moderator {
            return Err(ServiceError::forbidden("checklist belongs to another user"));
        }
        Ok(self.store.lineage_detail(id).await?)
    }

    /// Derive the next version of the caller's checklist.
    pub async fn create_version(
        &self,
        actor: Actor,
        checklist_id: i64,
        edit: &ChecklistEdit,
    ) -> Result<CreatedChecklist, ServiceError> {
        if let Some(specs) = &edit.questions {
            validate_specs(specs)?;
        }
        self.owned_personal(actor, checklist_id).await?;
        Ok(self.store.create_version(checklist_id, edit).await?)
    }

    /// Edit one version in place without creating a new version.
    pub async fn update_content(
        &self,
        actor: Actor,
        checklist_id: i64,
        edit: &ContentEdit,
    ) -> Result<Checklist, ServiceError> {
        edit.validate()?;
        self.owned_personal(actor, checklist_id).await?;
        Ok(self.store.update_content(checklist_id, edit).await?)
    }

    /// Delete one version of the caller's checklist.
    pub async fn delete_version(&self, actor: Actor, id: i64) -> Result<(), ServiceError> {
        self.owned_personal(actor, id).await?;
        Ok(self.store.delete_version(id).await?)
    }

    /// Delete a whole lineage. Only addressable by its root.
    pub async fn delete_lineage(&self, actor: Actor, id: i64) -> Result<usize, ServiceError> {
        let checklist = self.owned_personal(actor, id).await?;
        if !checklist.is_root() {
            return Err(ServiceError::validation("This is not a parent checklist."));
        }
        Ok(self.store.delete_lineage(id).await?)
    }

    async fn personal(&self, id: i64) -> Result<Checklist, ServiceError> {
        self.store
            .get_checklist(id)
            .await?
            .filter(|c| c.kind == ChecklistKind::Personal)
            .ok_or_else(|| StorageError::not_found("checklist", id).into())
    }

    async fn owned_personal(&self, actor: Actor, id: i64) -> Result<Checklist, ServiceError> {
        let checklist = self.personal(id).await?;
        if checklist.owner_id != actor.id {
            tracing::debug!(checklist_id = id, actor_id = actor.id, "ownership check failed");
            return Err(ServiceError::forbidden("checklist belongs to another user"));
        }
        Ok(checklist)
    }
}
