//! Shared test harness for the service layer.
//!
//! `MemStore` is an in-memory double implementing the storage traits with
//! the same planning functions the PostgreSQL backend drives, so service
//! tests exercise real link resolution and clone remapping without a
//! database.

#![expect(clippy::unwrap_used, reason = "test code")]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use checkflow_core::{
    clone_links, follow_up_links, parent_links, Checklist, ChecklistEdit, ChecklistKind,
    ContentEdit, NewChecklist, Question, QuestionSpec, QuestionType, ReviewAction, ReviewStatus,
    TempIdMap, TempRefs,
};
use checkflow_storage::traits::{CatalogStore, ChecklistStore, ReviewStore, Store};
use checkflow_storage::{
    ChecklistWithQuestions, CreatedChecklist, LineageDetail, ReviewOutcome, StorageError,
    VersionRef,
};
use chrono::Utc;

use crate::{CatalogService, ChecklistService, ReviewService};

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<MemDb>,
}

#[derive(Default)]
struct MemDb {
    checklists: Vec<Checklist>,
    questions: Vec<Question>,
    next_checklist_id: i64,
    next_question_id: i64,
}

fn base_row(kind: ChecklistKind, owner_id: i64, name: &str) -> Checklist {
    Checklist {
        id: 0,
        kind,
        version: 1,
        parent_id: None,
        owner_id,
        name: name.to_owned(),
        description: None,
        diagram_source: None,
        status: None,
        review_comment: None,
        reviewed_at: None,
        reviewer_id: None,
        adopted_from: None,
        created_at: Utc::now(),
    }
}

impl MemDb {
    fn push_checklist(&mut self, mut row: Checklist) -> Checklist {
        self.next_checklist_id += 1;
        row.id = self.next_checklist_id;
        self.checklists.push(row.clone());
        row
    }

    fn checklist(&self, id: i64) -> Option<Checklist> {
        self.checklists.iter().find(|c| c.id == id).cloned()
    }

    fn question_mut(&mut self, id: i64) -> &mut Question {
        self.questions.iter_mut().find(|q| q.id == id).unwrap()
    }

    fn questions_of(&self, checklist_id: i64) -> Vec<Question> {
        self.questions.iter().filter(|q| q.checklist_id == checklist_id).cloned().collect()
    }

    /// Same three passes as the SQL backend, against vectors.
    fn build_tree(&mut self, checklist_id: i64, specs: &[QuestionSpec]) -> TempIdMap {
        let mut ids = Vec::with_capacity(specs.len());
        for spec in specs {
            self.next_question_id += 1;
            let id = self.next_question_id;
            self.questions.push(Question {
                id,
                checklist_id,
                question_type: spec.effective_type(),
                prompt: spec.question.clone(),
                description: spec.description.clone().unwrap_or_default(),
                options: spec.stored_options().cloned(),
                parent_id: None,
                follow_ups: None,
            });
            ids.push(id);
        }
        let map = TempIdMap::from_allocations(specs, &ids);
        for (id, parent_id) in parent_links(specs, &ids, &map) {
            self.question_mut(id).parent_id = Some(parent_id);
        }
        for (id, follow_ups) in follow_up_links(specs, &map) {
            self.question_mut(id).follow_ups = Some(follow_ups);
        }
        map
    }

    fn copy_tree(&mut self, source_id: i64, dest_id: i64) -> Vec<Question> {
        let source = self.questions_of(source_id);
        let mut dest_ids = Vec::with_capacity(source.len());
        for question in &source {
            self.next_question_id += 1;
            let id = self.next_question_id;
            dest_ids.push(id);
            self.questions.push(Question {
                id,
                checklist_id: dest_id,
                parent_id: None,
                follow_ups: None,
                ..question.clone()
            });
        }
        let links = clone_links(&source, &dest_ids);
        for (id, parent_id) in links.parent_updates {
            self.question_mut(id).parent_id = Some(parent_id);
        }
        for (id, follow_ups) in links.follow_up_updates {
            self.question_mut(id).follow_ups = Some(follow_ups);
        }
        self.questions_of(dest_id)
    }
}

impl MemStore {
    pub fn checklist_count(&self) -> usize {
        self.inner.lock().unwrap().checklists.len()
    }

    pub fn question_count(&self) -> usize {
        self.inner.lock().unwrap().questions.len()
    }

    pub fn questions_of(&self, checklist_id: i64) -> Vec<Question> {
        self.inner.lock().unwrap().questions_of(checklist_id)
    }
}

#[async_trait]
impl ChecklistStore for MemStore {
    async fn create_checklist(
        &self,
        owner_id: i64,
        input: &NewChecklist,
    ) -> Result<CreatedChecklist, StorageError> {
        let mut db = self.inner.lock().unwrap();
        let mut row = base_row(ChecklistKind::Personal, owner_id, &input.name);
        row.description = input.description.clone();
        row.diagram_source = input.diagram_source.clone();
        row.status = Some(ReviewStatus::Draft);
        let checklist = db.push_checklist(row);
        let map = db.build_tree(checklist.id, &input.questions);
        Ok(CreatedChecklist { checklist, temp_ids: map.into_inner() })
    }

    async fn create_version(
        &self,
        checklist_id: i64,
        edit: &ChecklistEdit,
    ) -> Result<CreatedChecklist, StorageError> {
        let mut db = self.inner.lock().unwrap();
        let base = db
            .checklists
            .iter()
            .filter(|c| c.parent_id == Some(checklist_id))
            .max_by_key(|c| c.version)
            .cloned()
            .or_else(|| db.checklist(checklist_id))
            .ok_or(StorageError::not_found("checklist", checklist_id))?;

        let mut row = base_row(base.kind, base.owner_id, &base.name);
        row.version = base.version + 1;
        row.parent_id = Some(base.root_id());
        row.description = edit.description.clone().or_else(|| base.description.clone());
        row.diagram_source =
            edit.diagram_source.clone().or_else(|| base.diagram_source.clone());
        row.status = (base.kind == ChecklistKind::Personal).then_some(ReviewStatus::Draft);
        let checklist = db.push_checklist(row);

        let temp_ids = match &edit.questions {
            Some(specs) => db.build_tree(checklist.id, specs).into_inner(),
            None => {
                db.copy_tree(base.id, checklist.id);
                HashMap::new()
            }
        };
        Ok(CreatedChecklist { checklist, temp_ids })
    }

    async fn update_content(
        &self,
        checklist_id: i64,
        edit: &ContentEdit,
    ) -> Result<Checklist, StorageError> {
        let mut db = self.inner.lock().unwrap();
        let current =
            db.checklist(checklist_id).ok_or(StorageError::not_found("checklist", checklist_id))?;
        if current.status == Some(ReviewStatus::Review) {
            return Err(StorageError::Conflict(format!(
                "checklist {checklist_id} is under review"
            )));
        }
        {
            let row = db.checklists.iter_mut().find(|c| c.id == checklist_id).unwrap();
            if let Some(name) = &edit.name {
                row.name = name.clone();
            }
            if let Some(description) = &edit.description {
                row.description = Some(description.clone());
            }
            if let Some(diagram) = &edit.diagram_source {
                row.diagram_source = Some(diagram.clone());
            }
        }
        for question_edit in &edit.questions {
            let Some(question) = db
                .questions
                .iter_mut()
                .find(|q| q.id == question_edit.id && q.checklist_id == checklist_id)
            else {
                continue;
            };
            let (prompt, description, options) = question.content_after(question_edit);
            question.prompt = prompt;
            question.description = description;
            question.options = options;
        }
        Ok(db.checklist(checklist_id).unwrap())
    }

    async fn get_checklist(&self, id: i64) -> Result<Option<Checklist>, StorageError> {
        Ok(self.inner.lock().unwrap().checklist(id))
    }

    async fn get_questions(&self, checklist_id: i64) -> Result<Vec<Question>, StorageError> {
        Ok(self.inner.lock().unwrap().questions_of(checklist_id))
    }

    async fn lineage_detail(&self, id: i64) -> Result<LineageDetail, StorageError> {
        let db = self.inner.lock().unwrap();
        let anchor = db.checklist(id).ok_or(StorageError::not_found("checklist", id))?;
        let root_id = anchor.root_id();
        let mut lineage: Vec<Checklist> = db
            .checklists
            .iter()
            .filter(|c| c.id == root_id || c.parent_id == Some(root_id))
            .cloned()
            .collect();
        lineage.sort_by(|a, b| b.version.cmp(&a.version));
        let latest =
            lineage.first().cloned().ok_or(StorageError::not_found("checklist", root_id))?;
        let questions = db.questions_of(latest.id);
        let versions =
            lineage.iter().map(|c| VersionRef { id: c.id, version: c.version }).collect();
        Ok(LineageDetail { latest, questions, versions })
    }

    async fn list_checklists(
        &self,
        kind: ChecklistKind,
        owner_id: Option<i64>,
    ) -> Result<Vec<Checklist>, StorageError> {
        let db = self.inner.lock().unwrap();
        let mut rows: Vec<Checklist> = db
            .checklists
            .iter()
            .filter(|c| c.kind == kind && owner_id.is_none_or(|owner| c.owner_id == owner))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn delete_version(&self, id: i64) -> Result<(), StorageError> {
        let mut db = self.inner.lock().unwrap();
        let checklist = db.checklist(id).ok_or(StorageError::not_found("checklist", id))?;
        if checklist.is_root() && db.checklists.iter().any(|c| c.parent_id == Some(id)) {
            return Err(StorageError::Conflict(
                "Cannot delete the first version while later versions exist".to_owned(),
            ));
        }
        db.questions.retain(|q| q.checklist_id != id);
        db.checklists.retain(|c| c.id != id);
        Ok(())
    }

    async fn delete_lineage(&self, root_id: i64) -> Result<usize, StorageError> {
        let mut db = self.inner.lock().unwrap();
        let root = db.checklist(root_id).ok_or(StorageError::not_found("checklist", root_id))?;
        if !root.is_root() {
            return Err(StorageError::Conflict("This is not a parent checklist.".to_owned()));
        }
        let ids: Vec<i64> = db
            .checklists
            .iter()
            .filter(|c| c.id == root_id || c.parent_id == Some(root_id))
            .map(|c| c.id)
            .collect();
        db.questions.retain(|q| !ids.contains(&q.checklist_id));
        db.checklists.retain(|c| !ids.contains(&c.id));
        Ok(ids.len())
    }
}

#[async_trait]
impl ReviewStore for MemStore {
    async fn submit_for_review(&self, checklist_id: i64) -> Result<Checklist, StorageError> {
        let mut db = self.inner.lock().unwrap();
        let Some(row) = db.checklists.iter_mut().find(|c| c.id == checklist_id) else {
            return Err(StorageError::not_found("checklist", checklist_id));
        };
        if row.kind != ChecklistKind::Personal || row.status != Some(ReviewStatus::Draft) {
            return Err(StorageError::Conflict(format!(
                "checklist {checklist_id} is not a draft (status: {})",
                row.status.map_or("none", ReviewStatus::as_str)
            )));
        }
        row.status = Some(ReviewStatus::Review);
        Ok(row.clone())
    }

    async fn decide_review(
        &self,
        checklist_id: i64,
        action: ReviewAction,
        comment: Option<&str>,
        reviewer_id: i64,
    ) -> Result<ReviewOutcome, StorageError> {
        // One lock for the whole decision, mirroring the row lock the SQL
        // backend holds.
        let mut db = self.inner.lock().unwrap();
        let reviewed = db
            .checklists
            .iter()
            .find(|c| {
                c.id == checklist_id
                    && c.kind == ChecklistKind::Personal
                    && c.status == Some(ReviewStatus::Review)
            })
            .cloned()
            .ok_or(StorageError::not_found("reviewable checklist", checklist_id))?;

        let catalog = match action {
            ReviewAction::Approve => {
                let mut row = base_row(ChecklistKind::Platform, reviewer_id, &reviewed.name);
                row.description = reviewed.description.clone();
                row.diagram_source = reviewed.diagram_source.clone();
                let catalog = db.push_checklist(row);
                db.copy_tree(reviewed.id, catalog.id);
                Some(catalog)
            }
            ReviewAction::Reject => None,
        };

        let row = db.checklists.iter_mut().find(|c| c.id == checklist_id).unwrap();
        row.status = Some(match action {
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
        });
        row.review_comment = comment.map(str::to_owned);
        row.reviewed_at = Some(Utc::now());
        row.reviewer_id = Some(reviewer_id);
        let reviewed = row.clone();

        Ok(match catalog {
            Some(catalog) => ReviewOutcome::Approved { reviewed, catalog },
            None => ReviewOutcome::Rejected { reviewed },
        })
    }

    async fn list_in_review(&self) -> Result<Vec<Checklist>, StorageError> {
        let db = self.inner.lock().unwrap();
        let mut rows: Vec<Checklist> = db
            .checklists
            .iter()
            .filter(|c| {
                c.kind == ChecklistKind::Personal && c.status == Some(ReviewStatus::Review)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }
}

#[async_trait]
impl CatalogStore for MemStore {
    async fn adopt_checklist(
        &self,
        catalog_id: i64,
        owner_id: i64,
    ) -> Result<ChecklistWithQuestions, StorageError> {
        let mut db = self.inner.lock().unwrap();
        let source = db
            .checklist(catalog_id)
            .filter(|c| c.kind == ChecklistKind::Platform)
            .ok_or(StorageError::not_found("platform checklist", catalog_id))?;
        let root_id = source.root_id();
        let latest = db
            .checklists
            .iter()
            .filter(|c| c.parent_id == Some(root_id))
            .max_by_key(|c| c.version)
            .cloned()
            .unwrap_or(source);

        let mut row = base_row(ChecklistKind::Personal, owner_id, &latest.name);
        row.description = latest.description.clone();
        row.diagram_source = latest.diagram_source.clone();
        row.status = Some(ReviewStatus::Draft);
        row.adopted_from = Some(root_id);
        let checklist = db.push_checklist(row);
        let questions = db.copy_tree(latest.id, checklist.id);
        Ok(ChecklistWithQuestions { checklist, questions })
    }
}

// ── Harness ───────────────────────────────────────────────────────────────

pub struct TestEnv {
    pub checklists: ChecklistService,
    pub reviews: ReviewService,
    pub catalog: CatalogService,
    pub store: Arc<MemStore>,
}

pub fn test_env() -> TestEnv {
    let store = Arc::new(MemStore::default());
    let dyn_store: Arc<dyn Store> = store.clone();
    TestEnv {
        checklists: ChecklistService::new(Arc::clone(&dyn_store)),
        reviews: ReviewService::new(Arc::clone(&dyn_store)),
        catalog: CatalogService::new(dyn_store),
        store,
    }
}

pub fn spec(text: &str) -> QuestionSpec {
    QuestionSpec {
        question: text.to_owned(),
        description: None,
        question_type: None,
        options: None,
        temp_id: None,
        parent_temp_id: None,
        follow_ups: None,
    }
}

pub fn spec_with_temp(text: &str, temp_id: &str) -> QuestionSpec {
    QuestionSpec { temp_id: Some(temp_id.to_owned()), ..spec(text) }
}

pub fn child_spec(text: &str, temp_id: &str, parent: &str) -> QuestionSpec {
    QuestionSpec { parent_temp_id: Some(parent.to_owned()), ..spec_with_temp(text, temp_id) }
}

pub fn choice_spec(
    text: &str,
    temp_id: &str,
    options: &[&str],
    follow_ups: BTreeMap<String, TempRefs>,
) -> QuestionSpec {
    QuestionSpec {
        question_type: Some(QuestionType::Choice),
        options: Some(options.iter().map(|o| (*o).to_owned()).collect()),
        follow_ups: Some(follow_ups),
        ..spec_with_temp(text, temp_id)
    }
}

pub fn new_checklist(name: &str, questions: Vec<QuestionSpec>) -> NewChecklist {
    NewChecklist { name: name.to_owned(), description: None, diagram_source: None, questions }
}

/// The standard three-question payload: root, nested child, and a choice
/// revealing the child on its first option.
pub fn branching_payload() -> NewChecklist {
    let follow = BTreeMap::from([("0".to_owned(), TempRefs::Many(vec!["b".to_owned()]))]);
    new_checklist(
        "Prelaunch",
        vec![
            spec_with_temp("Scope agreed?", "a"),
            child_spec("Stakeholders signed off?", "b", "a"),
            choice_spec("Rollback plan ready?", "c", &["yes", "no"], follow),
        ],
    )
}
