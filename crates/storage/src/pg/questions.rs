//! Question-tree SQL shared by authoring, versioning, and cloning.

use checkflow_core::{
    clone_links, follow_up_links, parent_links, FollowUps, Question, QuestionContentEdit,
    QuestionSpec, TempIdMap,
};

use super::{row_to_question, PgTx, QUESTION_COLUMNS};
use crate::error::StorageError;

/// Allocation pass: persist content rows one by one, capturing each
/// generated id in input order. Structural columns stay null here.
pub(crate) async fn insert_question_rows(
    tx: &mut PgTx<'_>,
    checklist_id: i64,
    specs: &[QuestionSpec],
) -> Result<Vec<i64>, StorageError> {
    let mut ids = Vec::with_capacity(specs.len());
    for spec in specs {
        let options = spec.stored_options().map(serde_json::to_value).transpose()?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO questions (checklist_id, question_type, prompt, description, options)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(checklist_id)
        .bind(spec.effective_type().as_str())
        .bind(&spec.question)
        .bind(spec.description.as_deref().unwrap_or(""))
        .bind(options)
        .fetch_one(&mut **tx)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

pub(crate) async fn apply_parent_links(
    tx: &mut PgTx<'_>,
    links: &[(i64, i64)],
) -> Result<(), StorageError> {
    if links.is_empty() {
        return Ok(());
    }
    let (ids, parents): (Vec<i64>, Vec<i64>) = links.iter().copied().unzip();
    sqlx::query(
        "UPDATE questions q SET parent_id = u.parent_id
         FROM UNNEST($1::bigint[], $2::bigint[]) AS u(id, parent_id)
         WHERE q.id = u.id",
    )
    .bind(&ids)
    .bind(&parents)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub(crate) async fn apply_follow_up_links(
    tx: &mut PgTx<'_>,
    updates: &[(i64, FollowUps)],
) -> Result<(), StorageError> {
    if updates.is_empty() {
        return Ok(());
    }
    let mut ids = Vec::with_capacity(updates.len());
    let mut maps = Vec::with_capacity(updates.len());
    for (id, follow_ups) in updates {
        ids.push(*id);
        maps.push(serde_json::to_value(follow_ups)?);
    }
    sqlx::query(
        "UPDATE questions q SET follow_up_questions = u.follow_ups
         FROM UNNEST($1::bigint[], $2::jsonb[]) AS u(id, follow_ups)
         WHERE q.id = u.id",
    )
    .bind(&ids)
    .bind(&maps)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Build a full tree for `checklist_id` from authoring specs: allocate rows,
/// then resolve parent and follow-up links through the temp-id map.
pub(crate) async fn build_question_tree(
    tx: &mut PgTx<'_>,
    checklist_id: i64,
    specs: &[QuestionSpec],
) -> Result<TempIdMap, StorageError> {
    let ids = insert_question_rows(tx, checklist_id, specs).await?;
    let map = TempIdMap::from_allocations(specs, &ids);
    apply_parent_links(tx, &parent_links(specs, &ids, &map)).await?;
    apply_follow_up_links(tx, &follow_up_links(specs, &map)).await?;
    Ok(map)
}

/// Deep-copy the question tree of `source_checklist_id` under
/// `dest_checklist_id`, remapping every internal reference.
///
/// Content rows go in through one multi-row insert and the generated ids
/// come back per row, so nothing relies on gap-free id ranges.
pub(crate) async fn copy_question_tree(
    tx: &mut PgTx<'_>,
    source_checklist_id: i64,
    dest_checklist_id: i64,
) -> Result<Vec<Question>, StorageError> {
    let source = questions_in_tx(tx, source_checklist_id).await?;
    if source.is_empty() {
        return Ok(Vec::new());
    }

    let mut types = Vec::with_capacity(source.len());
    let mut prompts = Vec::with_capacity(source.len());
    let mut descriptions = Vec::with_capacity(source.len());
    let mut options: Vec<Option<serde_json::Value>> = Vec::with_capacity(source.len());
    for question in &source {
        types.push(question.question_type.as_str());
        prompts.push(question.prompt.as_str());
        descriptions.push(question.description.as_str());
        options.push(question.options.as_ref().map(serde_json::to_value).transpose()?);
    }

    let mut dest_ids: Vec<i64> = sqlx::query_scalar(
        "INSERT INTO questions (checklist_id, question_type, prompt, description, options)
         SELECT $1, t, p, d, o
         FROM UNNEST($2::text[], $3::text[], $4::text[], $5::jsonb[]) AS src(t, p, d, o)
         RETURNING id",
    )
    .bind(dest_checklist_id)
    .bind(&types)
    .bind(&prompts)
    .bind(&descriptions)
    .bind(&options)
    .fetch_all(&mut **tx)
    .await?;
    // One statement draws ascending sequence values, so sorted destination
    // ids line up with source order regardless of RETURNING order.
    dest_ids.sort_unstable();

    let links = clone_links(&source, &dest_ids);
    apply_parent_links(tx, &links.parent_updates).await?;
    apply_follow_up_links(tx, &links.follow_up_updates).await?;

    questions_in_tx(tx, dest_checklist_id).await
}

/// Apply in-place content edits to questions of `checklist_id`.
///
/// Edits addressing questions outside the checklist are ignored. Option
/// replacement honors the shape rule in
/// [`Question::content_after`](checkflow_core::Question::content_after).
pub(crate) async fn apply_content_edits(
    tx: &mut PgTx<'_>,
    checklist_id: i64,
    edits: &[QuestionContentEdit],
) -> Result<(), StorageError> {
    if edits.is_empty() {
        return Ok(());
    }
    let current = questions_in_tx(tx, checklist_id).await?;
    for edit in edits {
        let Some(question) = current.iter().find(|q| q.id == edit.id) else {
            tracing::debug!(question_id = edit.id, checklist_id, "skipping foreign question edit");
            continue;
        };
        let (prompt, description, options) = question.content_after(edit);
        let options_json = options.map(serde_json::to_value).transpose()?;
        sqlx::query(
            "UPDATE questions SET prompt = $1, description = $2, options = $3
             WHERE id = $4 AND checklist_id = $5",
        )
        .bind(&prompt)
        .bind(&description)
        .bind(options_json)
        .bind(edit.id)
        .bind(checklist_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub(crate) async fn questions_in_tx(
    tx: &mut PgTx<'_>,
    checklist_id: i64,
) -> Result<Vec<Question>, StorageError> {
    let rows = sqlx::query(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE checklist_id = $1 ORDER BY id"
    ))
    .bind(checklist_id)
    .fetch_all(&mut **tx)
    .await?;
    rows.iter().map(row_to_question).collect()
}
