use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_PAGE_SIZE, FORMAT_FOLDER, INVALID_FILE_NAME_CHARS, SCHEME_PRIVATE};

use super::system::SystemListEntry;

/// A file or folder in a data files listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub system: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileEntry {
    pub fn is_folder(&self) -> bool {
        self.format == FORMAT_FOLDER
    }

    /// Absolute path on the storage host, if the file's system is known.
    pub fn storage_path(&self, systems: &[SystemListEntry]) -> Option<String> {
        systems
            .iter()
            .find(|entry| entry.system == self.system)
            .map(|entry| format!("{}{}", entry.definition.storage.root_dir, self.path))
    }
}

/// Where a listing is shown. The main browser and the picker inside modals
/// keep separate listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilesSection {
    #[default]
    #[serde(rename = "FilesListing")]
    FilesListing,
    #[serde(rename = "modal")]
    Modal,
}

/// Location of a listing on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListingParams {
    pub api: String,
    pub scheme: String,
    pub system: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    #[serde(default)]
    pub listing: Vec<FileEntry>,
    #[serde(default)]
    pub reached_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Rename,
    Move,
    Copy,
    Trash,
    Download,
    #[serde(rename = "showpath")]
    ShowPath,
}

impl FileOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOperation::Rename => "rename",
            FileOperation::Move => "move",
            FileOperation::Copy => "copy",
            FileOperation::Trash => "trash",
            FileOperation::Download => "download",
            FileOperation::ShowPath => "showpath",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Running,
    Success,
    Error,
}

/// Which toolbar actions are available for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolbarPermissions {
    pub can_rename: bool,
    pub can_move: bool,
    pub can_copy: bool,
    pub can_download: bool,
    pub can_trash: bool,
}

impl ToolbarPermissions {
    pub fn evaluate(selected: &[FileEntry], scheme: &str) -> Self {
        let private = scheme == SCHEME_PRIVATE;
        let any = !selected.is_empty();
        let single = selected.len() == 1;

        Self {
            can_rename: single && private,
            can_move: any && private,
            can_copy: any && private,
            can_download: single && !selected[0].is_folder(),
            can_trash: any && private,
        }
    }
}

/// Names must be non-empty and free of quotes and path separators.
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(INVALID_FILE_NAME_CHARS)
}
