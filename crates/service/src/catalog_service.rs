use std::sync::Arc;

use checkflow_core::{
    group_lineages, validate_specs, Actor, Checklist, ChecklistEdit, ChecklistKind, Lineage,
};
use checkflow_storage::traits::Store;
use checkflow_storage::{ChecklistWithQuestions, CreatedChecklist, LineageDetail, StorageError};

use crate::review_service::require_moderator;
use crate::ServiceError;

/// The shared platform catalog: public reads, moderator-only writes, and
/// adoption into personal space.
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All platform checklists, grouped into lineages. Public.
    pub async fn list(&self) -> Result<Vec<Lineage>, ServiceError> {
        let rows = self.store.list_checklists(ChecklistKind::Platform, None).await?;
        Ok(group_lineages(rows))
    }

    /// Latest version of a platform lineage. Public.
    pub async fn detail(&self, id: i64) -> Result<LineageDetail, ServiceError> {
        self.platform(id).await?;
        Ok(self.store.lineage_detail(id).await?)
    }

    /// Derive the next version of a platform checklist. Moderators only.
    pub async fn create_version(
        &self,
        actor: Actor,
        catalog_id: i64,
        edit: &ChecklistEdit,
    ) -> Result<CreatedChecklist, ServiceError> {
        require_moderator(actor)?;
        if let Some(specs) = &edit.questions {
            validate_specs(specs)?;
        }
        self.platform(catalog_id).await?;
        Ok(self.store.create_version(catalog_id, edit).await?)
    }

    /// Delete one platform version. Moderators only.
    pub async fn delete_version(&self, actor: Actor, id: i64) -> Result<(), ServiceError> {
        require_moderator(actor)?;
        self.platform(id).await?;
        Ok(self.store.delete_version(id).await?)
    }

    /// Delete a whole platform lineage by its root. Moderators only.
    pub async fn delete_lineage(&self, actor: Actor, id: i64) -> Result<usize, ServiceError> {
        require_moderator(actor)?;
        let checklist = self.platform(id).await?;
        if !checklist.is_root() {
            return Err(ServiceError::validation("This is not a parent checklist."));
        }
        Ok(self.store.delete_lineage(id).await?)
    }

    /// Copy the current version of a platform lineage into the caller's
    /// personal space as a new draft.
    pub async fn adopt(
        &self,
        actor: Actor,
        catalog_id: i64,
    ) -> Result<ChecklistWithQuestions, ServiceError> {
        Ok(self.store.adopt_checklist(catalog_id, actor.id).await?)
    }

    async fn platform(&self, id: i64) -> Result<Checklist, ServiceError> {
        self.store
            .get_checklist(id)
            .await?
            .filter(|c| c.kind == ChecklistKind::Platform)
            .ok_or_else(|| StorageError::not_found("platform checklist", id).into())
    }
}
