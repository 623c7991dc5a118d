use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{QuestionType, ValidationError};

/// One question in an authoring payload.
///
/// `temp_id` is a client-assigned identifier that only lives for the
/// duration of the request. It lets the payload express structural links
/// (parent nesting, follow-up reveals) between questions that have no
/// durable ids yet, including forward references to items declared later in
/// the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub question_type: Option<QuestionType>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(rename = "tempId", default)]
    pub temp_id: Option<String>,
    #[serde(rename = "parentTempId", default)]
    pub parent_temp_id: Option<String>,
    #[serde(rename = "followUpQuestions", default)]
    pub follow_ups: Option<BTreeMap<String, TempRefs>>,
}

impl QuestionSpec {
    /// Question type with the omitted-field default applied.
    #[must_use]
    pub fn effective_type(&self) -> QuestionType {
        self.question_type.unwrap_or(QuestionType::Text)
    }

    /// Options as they will be stored: present only for choice questions.
    #[must_use]
    pub fn stored_options(&self) -> Option<&Vec<String>> {
        match self.effective_type() {
            QuestionType::Choice => self.options.as_ref(),
            QuestionType::Text => None,
        }
    }
}

/// Follow-up reference value on the wire: older clients send a single
/// scalar temp id where newer ones send a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TempRefs {
    One(String),
    Many(Vec<String>),
}

impl TempRefs {
    #[must_use]
    pub fn as_refs(&self) -> Vec<&str> {
        match self {
            Self::One(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Payload for creating a personal checklist together with its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagram_source: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

/// Payload for deriving the next version of a checklist.
///
/// `questions: None` carries the base version's tree forward unchanged; an
/// explicit list (even an empty one) replaces the tree entirely. The name is
/// deliberately absent: renames go through the edit-in-place path so a
/// lineage keeps a single name across versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistEdit {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagram_source: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionSpec>>,
}

/// In-place content edit of one version. Never touches versioning or tree
/// structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEdit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub diagram_source: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionContentEdit>,
}

impl ContentEdit {
    /// Rejects edits that would blank out required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::new("Checklist name must not be empty"));
        }
        if self
            .questions
            .iter()
            .any(|q| q.question.as_deref().is_some_and(|t| t.trim().is_empty()))
        {
            return Err(ValidationError::new("Each question must have text"));
        }
        Ok(())
    }
}

/// Content edit for a single question, addressed by durable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionContentEdit {
    pub id: i64,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}
