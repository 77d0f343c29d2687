use serde::{Deserialize, Serialize};

use crate::model::store::WithId;

/// Core question data.
///
/// Optional fields that are `None` are left out of the stored document, so a
/// merge-write leaves whatever the store already holds for them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCore {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A question without an ID.
pub type NewQuestion = QuestionCore;

/// A question from the store, with its unique ID.
pub type Question = WithId<QuestionCore>;
