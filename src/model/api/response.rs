use serde::{Deserialize, Serialize};

/// A bare acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An acknowledgement of a write, echoing what was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse<T> {
    pub message: String,
    pub response: T,
}

impl<T> WriteResponse<T> {
    pub fn new(message: impl Into<String>, response: T) -> Self {
        Self {
            message: message.into(),
            response,
        }
    }
}
