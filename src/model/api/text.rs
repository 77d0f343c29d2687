use serde::{Deserialize, Serialize};

/// A free-text form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSubmission {
    pub input_text: String,
}
