//! ReviewStore implementation for PgStorage.

use super::*;

use async_trait::async_trait;
use checkflow_core::ReviewAction;

use super::checklists::{insert_checklist_row, ChecklistRowSeed};
use super::questions::copy_question_tree;
use crate::error::StorageError;
use crate::traits::{ChecklistStore, ReviewStore};
use crate::types::ReviewOutcome;

#[async_trait]
impl ReviewStore for PgStorage {
    async fn submit_for_review(&self, checklist_id: i64) -> Result<Checklist, StorageError> {
        let row = sqlx::query(&format!(
            "UPDATE checklists SET status = $1
             WHERE id = $2 AND kind = $3 AND status = $4
             RETURNING {CHECKLIST_COLUMNS}"
        ))
        .bind(ReviewStatus::Review.as_str())
        .bind(checklist_id)
        .bind(ChecklistKind::Personal.as_str())
        .bind(ReviewStatus::Draft.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                tracing::info!(checklist_id, "checklist submitted for review");
                row_to_checklist(&row)
            }
            // Guarded update matched nothing: tell missing apart from
            // wrong-state.
            None => match self.get_checklist(checklist_id).await? {
                Some(existing) => Err(StorageError::Conflict(format!(
                    "checklist {checklist_id} is not a draft (status: {})",
                    existing.status.map_or("none", ReviewStatus::as_str)
                ))),
                None => Err(StorageError::not_found("checklist", checklist_id)),
            },
        }
    }

    async fn decide_review(
        &self,
        checklist_id: i64,
        action: ReviewAction,
        comment: Option<&str>,
        reviewer_id: i64,
    ) -> Result<ReviewOutcome, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Exclusive lock held for the whole decision. The loser of a
        // concurrent decision blocks here, then re-evaluates the predicate
        // against the committed status and matches nothing.
        let row = sqlx::query(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists
             WHERE id = $1 AND kind = $2 AND status = $3
             FOR UPDATE"
        ))
        .bind(checklist_id)
        .bind(ChecklistKind::Personal.as_str())
        .bind(ReviewStatus::Review.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::not_found("reviewable checklist", checklist_id))?;
        let reviewed = row_to_checklist(&row)?;

        let catalog = match action {
            ReviewAction::Approve => {
                let catalog = insert_checklist_row(
                    &mut tx,
                    ChecklistRowSeed {
                        kind: ChecklistKind::Platform,
                        version: 1,
                        parent_id: None,
                        owner_id: reviewer_id,
                        name: reviewed.name.clone(),
                        description: reviewed.description.clone(),
                        diagram_source: reviewed.diagram_source.clone(),
                        status: None,
                        adopted_from: None,
                    },
                )
                .await?;
                copy_question_tree(&mut tx, reviewed.id, catalog.id).await?;
                Some(catalog)
            }
            ReviewAction::Reject => None,
        };

        let new_status = match action {
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
        };
        let row = sqlx::query(&format!(
            "UPDATE checklists
             SET status = $1, review_comment = $2, reviewed_at = $3, reviewer_id = $4
             WHERE id = $5
             RETURNING {CHECKLIST_COLUMNS}"
        ))
        .bind(new_status.as_str())
        .bind(comment)
        .bind(Utc::now())
        .bind(reviewer_id)
        .bind(checklist_id)
        .fetch_one(&mut *tx)
        .await?;
        let reviewed = row_to_checklist(&row)?;

        tx.commit().await?;

        match catalog {
            Some(catalog) => {
                tracing::info!(
                    checklist_id,
                    catalog_id = catalog.id,
                    reviewer_id,
                    "approved checklist into platform catalog"
                );
                Ok(ReviewOutcome::Approved { reviewed, catalog })
            }
            None => {
                tracing::info!(checklist_id, reviewer_id, "rejected checklist");
                Ok(ReviewOutcome::Rejected { reviewed })
            }
        }
    }

    async fn list_in_review(&self) -> Result<Vec<Checklist>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists
             WHERE kind = $1 AND status = $2
             ORDER BY id ASC"
        ))
        .bind(ChecklistKind::Personal.as_str())
        .bind(ReviewStatus::Review.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_checklist).collect()
    }
}
