//! PostgreSQL backend.
//!
//! One file per concern (checklists, questions, reviews, catalog); shared
//! row decoding and the connection pool live here.

mod catalog;
mod checklists;
mod questions;
mod reviews;

use checkflow_core::{Checklist, ChecklistKind, Question, QuestionType, ReviewStatus};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::error::StorageError;
use crate::migrations::run_migrations;

const DEFAULT_POOL_SIZE: u32 = 8;
const POOL_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const POOL_IDLE_TIMEOUT_SECS: u64 = 600;

pub(crate) type PgTx<'a> = Transaction<'a, Postgres>;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect, run migrations, and return the backend.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size())
            .acquire_timeout(std::time::Duration::from_secs(POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_migrations(&pool).await.map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!(pool_size = pool_size(), "connected to PostgreSQL");
        Ok(Self { pool })
    }
}

fn pool_size() -> u32 {
    std::env::var("CHECKFLOW_DB_POOL_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_POOL_SIZE)
}

pub(crate) const CHECKLIST_COLUMNS: &str = "id, kind, version, parent_id, owner_id, name, \
     description, diagram_source, status, review_comment, reviewed_at, reviewer_id, \
     adopted_from, created_at";

pub(crate) const QUESTION_COLUMNS: &str =
    "id, checklist_id, question_type, prompt, description, options, parent_id, \
     follow_up_questions";

fn corrupt<E>(context: &'static str) -> impl FnOnce(E) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| StorageError::DataCorruption { context: context.to_owned(), source: Box::new(e) }
}

pub(crate) fn row_to_checklist(row: &PgRow) -> Result<Checklist, StorageError> {
    let kind: ChecklistKind =
        row.try_get::<String, _>("kind")?.parse().map_err(corrupt("checklist kind"))?;
    let status = row
        .try_get::<Option<String>, _>("status")?
        .map(|s| s.parse::<ReviewStatus>())
        .transpose()
        .map_err(corrupt("review status"))?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Checklist {
        id: row.try_get("id")?,
        kind,
        version: row.try_get("version")?,
        parent_id: row.try_get("parent_id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        diagram_source: row.try_get("diagram_source")?,
        status,
        review_comment: row.try_get("review_comment")?,
        reviewed_at: row.try_get("reviewed_at")?,
        reviewer_id: row.try_get("reviewer_id")?,
        adopted_from: row.try_get("adopted_from")?,
        created_at,
    })
}

pub(crate) fn row_to_question(row: &PgRow) -> Result<Question, StorageError> {
    let question_type: QuestionType =
        row.try_get::<String, _>("question_type")?.parse().map_err(corrupt("question type"))?;
    let options: Option<Vec<String>> = row
        .try_get::<Option<serde_json::Value>, _>("options")?
        .map(serde_json::from_value)
        .transpose()?;
    let follow_ups = row
        .try_get::<Option<serde_json::Value>, _>("follow_up_questions")?
        .map(serde_json::from_value)
        .transpose()?;

    Ok(Question {
        id: row.try_get("id")?,
        checklist_id: row.try_get("checklist_id")?,
        question_type,
        prompt: row.try_get("prompt")?,
        description: row.try_get("description")?,
        options,
        parent_id: row.try_get("parent_id")?,
        follow_ups,
    })
}
