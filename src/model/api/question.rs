use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::db::question::NewQuestion;

/// A question as submitted for creation or update.
///
/// The title is taken as any JSON value so that a wrongly typed title reaches
/// [`QuestionSpec::into_question`] instead of being turned away by the body
/// parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub title: Option<Value>,
    pub category: Option<String>,
    pub complexity: Option<String>,
    pub description: Option<String>,
}

impl QuestionSpec {
    /// Normalise into the stored form, trimming the title.
    ///
    /// The title must be present and a string; every other field passes
    /// through as-is.
    pub fn into_question(self) -> Result<NewQuestion> {
        let title = match self.title {
            Some(Value::String(title)) => title,
            None | Some(Value::Null) => return Err(Error::MissingField("title")),
            Some(_) => return Err(Error::NotAString("title")),
        };
        Ok(NewQuestion {
            title: title.trim().to_string(),
            category: self.category,
            complexity: self.complexity,
            description: self.description,
        })
    }
}
