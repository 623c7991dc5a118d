//! CatalogStore implementation for PgStorage.

use super::*;

use async_trait::async_trait;

use super::checklists::{checklist_in_tx, insert_checklist_row, ChecklistRowSeed};
use super::questions::copy_question_tree;
use crate::error::StorageError;
use crate::traits::CatalogStore;
use crate::types::ChecklistWithQuestions;

#[async_trait]
impl CatalogStore for PgStorage {
    async fn adopt_checklist(
        &self,
        catalog_id: i64,
        owner_id: i64,
    ) -> Result<ChecklistWithQuestions, StorageError> {
        let mut tx = self.pool.begin().await?;
        let source = checklist_in_tx(&mut tx, catalog_id)
            .await?
            .filter(|c| c.kind == ChecklistKind::Platform)
            .ok_or(StorageError::not_found("platform checklist", catalog_id))?;

        // Adopters take the lineage's current content regardless of which
        // version id they addressed; adopted_from records the root.
        let root_id = source.root_id();
        let latest_row = sqlx::query(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists
             WHERE parent_id = $1 ORDER BY version DESC LIMIT 1"
        ))
        .bind(root_id)
        .fetch_optional(&mut *tx)
        .await?;
        let latest = match latest_row {
            Some(row) => row_to_checklist(&row)?,
            None => source,
        };

        let checklist = insert_checklist_row(
            &mut tx,
            ChecklistRowSeed {
                kind: ChecklistKind::Personal,
                version: 1,
                parent_id: None,
                owner_id,
                name: latest.name.clone(),
                description: latest.description.clone(),
                diagram_source: latest.diagram_source.clone(),
                status: Some(ReviewStatus::Draft),
                adopted_from: Some(root_id),
            },
        )
        .await?;
        let questions = copy_question_tree(&mut tx, latest.id, checklist.id).await?;
        tx.commit().await?;

        tracing::info!(
            root_id,
            source_id = latest.id,
            checklist_id = checklist.id,
            owner_id,
            "adopted platform checklist"
        );
        Ok(ChecklistWithQuestions { checklist, questions })
    }
}
