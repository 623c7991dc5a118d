//! Question-tree construction planning.
//!
//! Clients submit a whole hierarchical tree in one payload, with structural
//! links expressed through request-scoped temp ids that may point forward at
//! items declared later. Construction is therefore staged: allocate a row
//! per item and record the temp-id mapping, then resolve parent links
//! through the map, then resolve follow-up links through the same map.
//!
//! Resolution is deliberately lenient. Authoring UIs routinely leave stale
//! temp ids behind, and a single dangling link must not sink an otherwise
//! valid submission, so unresolved references are dropped silently (logged
//! at debug level). Validation of the items themselves happens up front and
//! is strict.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{FollowUps, Question, QuestionSpec, QuestionType, TempRefs, ValidationError};

/// Request-scoped mapping from client temp ids to durable question ids.
#[derive(Debug, Clone, Default)]
pub struct TempIdMap {
    ids: HashMap<String, i64>,
}

impl TempIdMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the allocation pass: one durable id per spec, in input order.
    /// Specs without a temp id take up an id slot but enter no mapping.
    #[must_use]
    pub fn from_allocations(specs: &[QuestionSpec], ids: &[i64]) -> Self {
        let mut map = Self::new();
        for (spec, id) in specs.iter().zip(ids) {
            if let Some(temp_id) = &spec.temp_id {
                map.record(temp_id, *id);
            }
        }
        map
    }

    pub fn record(&mut self, temp_id: &str, durable_id: i64) {
        self.ids.insert(temp_id.to_owned(), durable_id);
    }

    #[must_use]
    pub fn resolve(&self, temp_id: &str) -> Option<i64> {
        self.ids.get(temp_id).copied()
    }

    /// The full mapping, handed back to clients so they can swap local temp
    /// ids for durable ones without refetching.
    #[must_use]
    pub fn into_inner(self) -> HashMap<String, i64> {
        self.ids
    }
}

/// Validate an authoring batch before anything is written.
///
/// Strict, unlike link resolution: a bad item fails the whole submission so
/// no partial tree is ever persisted.
pub fn validate_specs(specs: &[QuestionSpec]) -> Result<(), ValidationError> {
    for spec in specs {
        if spec.question.trim().is_empty() {
            return Err(ValidationError::new("Each question must have text"));
        }
        if spec.effective_type() == QuestionType::Choice
            && spec.options.as_ref().is_none_or(Vec::is_empty)
        {
            return Err(ValidationError::new(
                "Choice questions must have at least one option",
            ));
        }
    }
    ensure_acyclic(specs)
}

/// Parent links may only form a forest. Only links between declared temp
/// ids can close a cycle; a parent reference that will be dropped at
/// resolution time cannot.
fn ensure_acyclic(specs: &[QuestionSpec]) -> Result<(), ValidationError> {
    let declared: HashSet<&str> = specs.iter().filter_map(|s| s.temp_id.as_deref()).collect();
    let parent_of: HashMap<&str, &str> = specs
        .iter()
        .filter_map(|s| {
            let child = s.temp_id.as_deref()?;
            let parent = s.parent_temp_id.as_deref()?;
            declared.contains(parent).then_some((child, parent))
        })
        .collect();

    for start in parent_of.keys() {
        let mut hops = 0usize;
        let mut current = *start;
        while let Some(parent) = parent_of.get(current) {
            hops += 1;
            if hops > parent_of.len() {
                return Err(ValidationError::new(
                    "Question nesting must not form a cycle",
                ));
            }
            current = parent;
        }
    }
    Ok(())
}

/// Parent-link pass: one `(question id, parent question id)` pair per spec
/// whose parent reference resolves. Unresolved references are dropped.
#[must_use]
pub fn parent_links(specs: &[QuestionSpec], ids: &[i64], map: &TempIdMap) -> Vec<(i64, i64)> {
    let mut links = Vec::new();
    for (spec, id) in specs.iter().zip(ids) {
        let Some(parent_temp) = spec.parent_temp_id.as_deref() else {
            continue;
        };
        match map.resolve(parent_temp) {
            Some(parent_id) => links.push((*id, parent_id)),
            None => {
                tracing::debug!(temp_id = %parent_temp, "dropping unresolved parent reference");
            }
        }
    }
    links
}

/// Follow-up pass: rewritten follow-up maps for choice specs that carry
/// their own temp id and a follow-up map.
///
/// Every referenced temp id goes through the map. Unresolved ids are
/// dropped; an option index whose list ends up empty is omitted; a map left
/// empty entirely produces no entry at all, so the column stays null.
#[must_use]
pub fn follow_up_links(specs: &[QuestionSpec], map: &TempIdMap) -> Vec<(i64, FollowUps)> {
    let mut updates = Vec::new();
    for spec in specs {
        if spec.effective_type() != QuestionType::Choice {
            continue;
        }
        let (Some(temp_id), Some(raw)) = (&spec.temp_id, &spec.follow_ups) else {
            continue;
        };
        let Some(question_id) = map.resolve(temp_id) else {
            continue;
        };
        if let Some(follow_ups) = resolve_follow_ups(raw, map) {
            updates.push((question_id, follow_ups));
        }
    }
    updates
}

fn resolve_follow_ups(raw: &BTreeMap<String, TempRefs>, map: &TempIdMap) -> Option<FollowUps> {
    let mut resolved = FollowUps::new();
    for (option_index, refs) in raw {
        let ids: Vec<i64> = refs
            .as_refs()
            .into_iter()
            .filter_map(|temp_id| {
                let id = map.resolve(temp_id);
                if id.is_none() {
                    tracing::debug!(temp_id = %temp_id, "dropping unresolved follow-up reference");
                }
                id
            })
            .collect();
        if !ids.is_empty() {
            resolved.insert(option_index.clone(), ids);
        }
    }
    (!resolved.is_empty()).then_some(resolved)
}

/// Structural updates to apply after cloning content rows.
#[derive(Debug, Clone, Default)]
pub struct CloneLinks {
    /// `(destination question id, destination parent id)` pairs.
    pub parent_updates: Vec<(i64, i64)>,
    /// `(destination question id, rewritten follow-up map)` pairs.
    pub follow_up_updates: Vec<(i64, FollowUps)>,
}

/// Plan the link rewrite for a cloned question tree.
///
/// `dest_ids` are the freshly inserted ids in source order. Every parent and
/// follow-up reference is remapped through the source-to-destination table;
/// references pointing outside the cloned set are dropped, and a follow-up
/// map that ends up empty is skipped so the clone stores null there.
#[must_use]
pub fn clone_links(source: &[Question], dest_ids: &[i64]) -> CloneLinks {
    let id_map: HashMap<i64, i64> = source
        .iter()
        .map(|q| q.id)
        .zip(dest_ids.iter().copied())
        .collect();

    let mut links = CloneLinks::default();
    for (question, dest_id) in source.iter().zip(dest_ids) {
        if let Some(parent) = question.parent_id {
            if let Some(mapped) = id_map.get(&parent) {
                links.parent_updates.push((*dest_id, *mapped));
            }
        }
        let Some(follow_ups) = &question.follow_ups else {
            continue;
        };
        let mut rewritten = FollowUps::new();
        for (option_index, question_ids) in follow_ups {
            let mapped: Vec<i64> = question_ids
                .iter()
                .filter_map(|id| id_map.get(id).copied())
                .collect();
            if !mapped.is_empty() {
                rewritten.insert(option_index.clone(), mapped);
            }
        }
        if !rewritten.is_empty() {
            links.follow_up_updates.push((*dest_id, rewritten));
        }
    }
    links
}
