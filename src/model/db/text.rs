use serde::{Deserialize, Serialize};

/// A free-form text submission. Only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    pub text: String,
}
