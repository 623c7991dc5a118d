//! ChecklistStore implementation for PgStorage.

use super::*;

use async_trait::async_trait;
use checkflow_core::{ChecklistEdit, ContentEdit, NewChecklist};
use std::collections::HashMap;

use super::questions::{apply_content_edits, build_question_tree, copy_question_tree};
use crate::error::StorageError;
use crate::traits::ChecklistStore;
use crate::types::{CreatedChecklist, LineageDetail, VersionRef};

/// Column values for a new checklist row; id and created_at come from the
/// database.
pub(crate) struct ChecklistRowSeed {
    pub kind: ChecklistKind,
    pub version: i32,
    pub parent_id: Option<i64>,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub diagram_source: Option<String>,
    pub status: Option<ReviewStatus>,
    pub adopted_from: Option<i64>,
}

pub(crate) async fn insert_checklist_row(
    tx: &mut PgTx<'_>,
    seed: ChecklistRowSeed,
) -> Result<Checklist, StorageError> {
    let row = sqlx::query(&format!(
        "INSERT INTO checklists
           (kind, version, parent_id, owner_id, name, description, diagram_source, status,
            adopted_from)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {CHECKLIST_COLUMNS}"
    ))
    .bind(seed.kind.as_str())
    .bind(seed.version)
    .bind(seed.parent_id)
    .bind(seed.owner_id)
    .bind(&seed.name)
    .bind(&seed.description)
    .bind(&seed.diagram_source)
    .bind(seed.status.map(ReviewStatus::as_str))
    .bind(seed.adopted_from)
    .fetch_one(&mut **tx)
    .await?;
    row_to_checklist(&row)
}

pub(crate) async fn checklist_in_tx(
    tx: &mut PgTx<'_>,
    id: i64,
) -> Result<Option<Checklist>, StorageError> {
    let row = sqlx::query(&format!("SELECT {CHECKLIST_COLUMNS} FROM checklists WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    row.map(|r| row_to_checklist(&r)).transpose()
}

#[async_trait]
impl ChecklistStore for PgStorage {
    async fn create_checklist(
        &self,
        owner_id: i64,
        input: &NewChecklist,
    ) -> Result<CreatedChecklist, StorageError> {
        let mut tx = self.pool.begin().await?;
        let checklist = insert_checklist_row(
            &mut tx,
            ChecklistRowSeed {
                kind: ChecklistKind::Personal,
                version: 1,
                parent_id: None,
                owner_id,
                name: input.name.clone(),
                description: input.description.clone(),
                diagram_source: input.diagram_source.clone(),
                status: Some(ReviewStatus::Draft),
                adopted_from: None,
            },
        )
        .await?;
        let map = build_question_tree(&mut tx, checklist.id, &input.questions).await?;
        tx.commit().await?;
        tracing::info!(checklist_id = checklist.id, owner_id, "created checklist");
        Ok(CreatedChecklist { checklist, temp_ids: map.into_inner() })
    }

    async fn create_version(
        &self,
        checklist_id: i64,
        edit: &ChecklistEdit,
    ) -> Result<CreatedChecklist, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Highest version pointing at the addressed row wins; a root with no
        // later versions serves as its own base.
        let base_row = sqlx::query(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists
             WHERE parent_id = $1 ORDER BY version DESC LIMIT 1"
        ))
        .bind(checklist_id)
        .fetch_optional(&mut *tx)
        .await?;
        let base = match base_row {
            Some(row) => row_to_checklist(&row)?,
            None => checklist_in_tx(&mut tx, checklist_id)
                .await?
                .ok_or(StorageError::not_found("checklist", checklist_id))?,
        };

        let checklist = insert_checklist_row(
            &mut tx,
            ChecklistRowSeed {
                kind: base.kind,
                version: base.version + 1,
                // Versions always hang off the lineage root, never off each
                // other.
                parent_id: Some(base.root_id()),
                owner_id: base.owner_id,
                name: base.name.clone(),
                description: edit.description.clone().or_else(|| base.description.clone()),
                diagram_source: edit
                    .diagram_source
                    .clone()
                    .or_else(|| base.diagram_source.clone()),
                status: (base.kind == ChecklistKind::Personal).then_some(ReviewStatus::Draft),
                adopted_from: None,
            },
        )
        .await?;

        let temp_ids = match &edit.questions {
            Some(specs) => build_question_tree(&mut tx, checklist.id, specs).await?.into_inner(),
            None => {
                copy_question_tree(&mut tx, base.id, checklist.id).await?;
                HashMap::new()
            }
        };

        tx.commit().await?;
        tracing::info!(
            checklist_id = checklist.id,
            base_id = base.id,
            version = checklist.version,
            "created checklist version"
        );
        Ok(CreatedChecklist { checklist, temp_ids })
    }

    async fn update_content(
        &self,
        checklist_id: i64,
        edit: &ContentEdit,
    ) -> Result<Checklist, StorageError> {
        let mut tx = self.pool.begin().await?;
        let current = checklist_in_tx(&mut tx, checklist_id)
            .await?
            .ok_or(StorageError::not_found("checklist", checklist_id))?;

        // A version sitting in review is the approval clone's source; its
        // content stays frozen until the decision lands.
        if current.status == Some(ReviewStatus::Review) {
            return Err(StorageError::Conflict(format!(
                "checklist {checklist_id} is under review"
            )));
        }

        let name = edit.name.clone().unwrap_or(current.name);
        let description = edit.description.clone().or(current.description);
        let diagram_source = edit.diagram_source.clone().or(current.diagram_source);
        let row = sqlx::query(&format!(
            "UPDATE checklists SET name = $1, description = $2, diagram_source = $3
             WHERE id = $4
             RETURNING {CHECKLIST_COLUMNS}"
        ))
        .bind(&name)
        .bind(&description)
        .bind(&diagram_source)
        .bind(checklist_id)
        .fetch_one(&mut *tx)
        .await?;
        let updated = row_to_checklist(&row)?;

        apply_content_edits(&mut tx, checklist_id, &edit.questions).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn get_checklist(&self, id: i64) -> Result<Option<Checklist>, StorageError> {
        let row = sqlx::query(&format!("SELECT {CHECKLIST_COLUMNS} FROM checklists WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_checklist(&r)).transpose()
    }

    async fn get_questions(&self, checklist_id: i64) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE checklist_id = $1 ORDER BY id"
        ))
        .bind(checklist_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_question).collect()
    }

    async fn lineage_detail(&self, id: i64) -> Result<LineageDetail, StorageError> {
        let anchor = self
            .get_checklist(id)
            .await?
            .ok_or(StorageError::not_found("checklist", id))?;
        let root_id = anchor.root_id();

        let rows = sqlx::query(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists
             WHERE id = $1 OR parent_id = $1
             ORDER BY version DESC"
        ))
        .bind(root_id)
        .fetch_all(&self.pool)
        .await?;
        let lineage: Vec<Checklist> =
            rows.iter().map(row_to_checklist).collect::<Result<_, _>>()?;
        let latest = lineage
            .first()
            .cloned()
            .ok_or(StorageError::not_found("checklist", root_id))?;

        let questions = self.get_questions(latest.id).await?;
        let versions =
            lineage.iter().map(|c| VersionRef { id: c.id, version: c.version }).collect();
        Ok(LineageDetail { latest, questions, versions })
    }

    async fn list_checklists(
        &self,
        kind: ChecklistKind,
        owner_id: Option<i64>,
    ) -> Result<Vec<Checklist>, StorageError> {
        let rows = match owner_id {
            Some(owner) => {
                sqlx::query(&format!(
                    "SELECT {CHECKLIST_COLUMNS} FROM checklists
                     WHERE kind = $1 AND owner_id = $2
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(kind.as_str())
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {CHECKLIST_COLUMNS} FROM checklists
                     WHERE kind = $1
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.iter().map(row_to_checklist).collect()
    }

    async fn delete_version(&self, id: i64) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        let checklist = checklist_in_tx(&mut tx, id)
            .await?
            .ok_or(StorageError::not_found("checklist", id))?;

        if checklist.is_root() {
            let survivors: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM checklists WHERE parent_id = $1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            if survivors > 0 {
                return Err(StorageError::Conflict(
                    "Cannot delete the first version while later versions exist".to_owned(),
                ));
            }
        }

        sqlx::query("DELETE FROM questions WHERE checklist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM checklists WHERE id = $1").bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!(checklist_id = id, "deleted checklist version");
        Ok(())
    }

    async fn delete_lineage(&self, root_id: i64) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await?;
        let root = checklist_in_tx(&mut tx, root_id)
            .await?
            .ok_or(StorageError::not_found("checklist", root_id))?;
        if !root.is_root() {
            return Err(StorageError::Conflict("This is not a parent checklist.".to_owned()));
        }

        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM checklists WHERE id = $1 OR parent_id = $1")
                .bind(root_id)
                .fetch_all(&mut *tx)
                .await?;
        sqlx::query("DELETE FROM questions WHERE checklist_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM checklists WHERE parent_id = $1")
            .bind(root_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM checklists WHERE id = $1")
            .bind(root_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(root_id, versions = ids.len(), "deleted checklist lineage");
        Ok(ids.len())
    }
}
