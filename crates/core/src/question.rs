use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::QuestionContentEdit;

/// Follow-up relation of a choice question: option index (stringified, as
/// JSON object keys must be) to the ordered question ids revealed when that
/// option is chosen. Never stored with an empty id list or as an empty map.
pub type FollowUps = BTreeMap<String, Vec<i64>>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Free-text answer, no options.
    Text,
    /// One answer from a fixed option list; options can reveal follow-ups.
    Choice,
}

impl QuestionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Choice => "choice",
        }
    }
}

impl std::str::FromStr for QuestionType {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "choice" => Ok(Self::Choice),
            _ => Err(crate::ValidationError::new(format!(
                "Invalid question type: {s}"
            ))),
        }
    }
}

/// One question row of a checklist version.
///
/// `parent_id` nests a question under another of the same checklist;
/// `follow_ups` conditions visibility on a chosen option. Both always point
/// within the owning checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i64,
    pub checklist_id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(rename = "question")]
    pub prompt: String,
    pub description: String,
    pub options: Option<Vec<String>>,
    pub parent_id: Option<i64>,
    #[serde(rename = "follow_up_questions")]
    pub follow_ups: Option<FollowUps>,
}

impl Question {
    /// Content fields after applying an in-place edit.
    ///
    /// Structure is never touched here. A replacement option list whose
    /// length differs from the stored one is ignored: option indexes are
    /// what follow-up maps point at, so the shape must not drift. The other
    /// fields still update in that case.
    #[must_use]
    pub fn content_after(
        &self,
        edit: &QuestionContentEdit,
    ) -> (String, String, Option<Vec<String>>) {
        let prompt = edit
            .question
            .clone()
            .unwrap_or_else(|| self.prompt.clone());
        let description = edit
            .description
            .clone()
            .unwrap_or_else(|| self.description.clone());
        let options = match (&edit.options, &self.options) {
            (Some(replacement), Some(current)) if replacement.len() == current.len() => {
                Some(replacement.clone())
            }
            _ => self.options.clone(),
        };
        (prompt, description, options)
    }
}
