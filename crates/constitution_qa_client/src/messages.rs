//! JSON bodies for `POST /api/v1/query`. Client ↔ server.

use serde::{Deserialize, Serialize};

/// Client → server: query request.
///
/// `documents` is a single URL string, not an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub questions: Vec<String>,
    pub documents: String,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            questions: vec![question.into()],
            documents: document.into(),
        }
    }
}

/// Server → client: query response. Every field is optional on the reading path,
/// and answer entries are kept as raw JSON so a `null` or non-string entry
/// still decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answers: Option<Vec<serde_json::Value>>,
}

impl QueryResponse {
    /// First answer, if it is a non-empty string. Later entries are ignored.
    pub fn first_answer(&self) -> Option<&str> {
        self.answers
            .as_ref()
            .and_then(|a| a.first())
            .and_then(serde_json::Value::as_str)
            .filter(|a| !a.is_empty())
    }
}
