//! Portal backend API.
//!
//! This module defines the interface the sagas use to reach the portal's
//! REST endpoints, the error type every call reports, and the HTTP
//! implementation built on reqwest.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{Allocations, FileEntry, FileListing, FileListingParams, JobEntry, PushKeysForm, SystemListEntry};

pub mod http;
pub mod query;
pub mod routes;

pub use http::HttpPortalApi;
pub use query::QueryParams;

/// Errors reported by backend calls.
///
/// Errors travel inside outcome actions, so they are plain data: cloneable,
/// comparable and serializable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ApiError::Status {
                code: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Address of a file on the data files API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTarget {
    pub api: String,
    pub scheme: String,
    pub system: String,
    pub path: String,
}

impl FileTarget {
    pub fn new(api: &str, scheme: &str, file: &FileEntry) -> Self {
        Self {
            api: api.to_string(),
            scheme: scheme.to_string(),
            system: file.system.clone(),
            path: file.path.clone(),
        }
    }
}

/// Where moved or copied files end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub system: String,
    pub path: String,
}

/// Interface to the portal backend.
///
/// Calls enforce no timeout of their own; a transport timeout surfaces as
/// [`ApiError::Transport`].
#[async_trait]
pub trait PortalApi: Send + Sync {
    // Workspace jobs
    async fn list_jobs(&self, params: &QueryParams) -> Result<Vec<JobEntry>, ApiError>;
    async fn submit_job(&self, job: &Value, csrf_token: Option<&str>) -> Result<Value, ApiError>;

    // Data files
    async fn list_files(&self, params: &FileListingParams) -> Result<FileListing, ApiError>;
    async fn rename_file(&self, target: &FileTarget, new_name: &str, csrf_token: Option<&str>)
        -> Result<Value, ApiError>;
    async fn move_file(&self, target: &FileTarget, dest: &Destination, csrf_token: Option<&str>)
        -> Result<Value, ApiError>;
    async fn copy_file(&self, target: &FileTarget, dest: &Destination, csrf_token: Option<&str>)
        -> Result<Value, ApiError>;
    async fn trash_file(&self, target: &FileTarget, csrf_token: Option<&str>) -> Result<Value, ApiError>;
    async fn download_link(&self, target: &FileTarget, csrf_token: Option<&str>) -> Result<String, ApiError>;

    // Accounts and systems
    async fn fetch_allocations(&self) -> Result<Allocations, ApiError>;
    async fn list_systems(&self) -> Result<Vec<SystemListEntry>, ApiError>;
    async fn push_keys(&self, system_id: &str, form: &PushKeysForm, csrf_token: Option<&str>)
        -> Result<Value, ApiError>;
}
