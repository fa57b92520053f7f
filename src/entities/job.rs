use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::LIST_ERROR_SENTINEL;

/// A job as listed by the workspace API.
///
/// Rows are carried as the backend sent them; the accessors read the few
/// fields the portal looks at and tolerate any type for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Job(Value);

impl Job {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The job id, rendered as text whether the backend sent a string or a number.
    pub fn id(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// The record a failed listing is replaced with: `{"error": "err!"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListError {
    pub error: String,
}

/// One row of a jobs listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobEntry {
    Error(ListError),
    Job(Job),
}

impl JobEntry {
    /// The uniform error row. Downstream code renders it instead of the list.
    pub fn list_error() -> Self {
        JobEntry::Error(ListError {
            error: LIST_ERROR_SENTINEL.to_string(),
        })
    }

    pub fn as_job(&self) -> Option<&Job> {
        match self {
            JobEntry::Job(job) => Some(job),
            JobEntry::Error(_) => None,
        }
    }
}
