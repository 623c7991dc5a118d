//! PostgreSQL schema migrations for checkflow storage.

use sqlx::PgPool;

/// Run all migrations. Idempotent; executed at pool construction.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS checklists (
            id BIGSERIAL PRIMARY KEY,
            kind TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            parent_id BIGINT REFERENCES checklists(id),
            owner_id BIGINT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            diagram_source TEXT,
            status TEXT,
            review_comment TEXT,
            reviewed_at TIMESTAMPTZ,
            reviewer_id BIGINT,
            adopted_from BIGINT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_checklists_parent ON checklists (parent_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_checklists_owner ON checklists (owner_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_checklists_kind_status ON checklists (kind, status)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_checklists_created ON checklists (created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id BIGSERIAL PRIMARY KEY,
            checklist_id BIGINT NOT NULL REFERENCES checklists(id),
            question_type TEXT NOT NULL DEFAULT 'text',
            prompt TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            options JSONB,
            parent_id BIGINT REFERENCES questions(id),
            follow_up_questions JSONB
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_questions_checklist ON questions (checklist_id)")
        .execute(pool)
        .await?;

    tracing::info!("schema migrations applied");
    Ok(())
}
