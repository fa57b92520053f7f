use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, Destination, QueryParams};
use crate::entities::{
    Allocations, FileEntry, FileListing, FileListingParams, FileOperation, FilesSection, JobEntry, OperationStatus,
    PushKeysForm, SystemListEntry, SystemsOperation,
};

/// Wire names of every action, shared with the rest of the UI.
pub mod types {
    pub const SHOW_SPINNER: &str = "SHOW_SPINNER";
    pub const HIDE_SPINNER: &str = "HIDE_SPINNER";

    pub const GET_JOBS: &str = "GET_JOBS";
    pub const JOBS_LIST: &str = "JOBS_LIST";
    pub const SUBMIT_JOB: &str = "SUBMIT_JOB";
    pub const FLUSH_SUBMIT: &str = "FLUSH_SUBMIT";
    pub const TOGGLE_SUBMITTING: &str = "TOGGLE_SUBMITTING";
    pub const SUBMIT_JOB_SUCCESS: &str = "SUBMIT_JOB_SUCCESS";
    pub const SUBMIT_JOB_ERROR: &str = "SUBMIT_JOB_ERROR";

    pub const FETCH_SYSTEMS: &str = "FETCH_SYSTEMS";
    pub const SYSTEMS_LIST: &str = "SYSTEMS_LIST";
    pub const SYSTEMS_LIST_ERROR: &str = "SYSTEMS_LIST_ERROR";
    pub const SYSTEMS_TOGGLE_MODAL: &str = "SYSTEMS_TOGGLE_MODAL";
    pub const SYSTEMS_PUSH_KEYS: &str = "SYSTEMS_PUSH_KEYS";
    pub const SYSTEMS_PUSH_KEYS_STARTED: &str = "SYSTEMS_PUSH_KEYS_STARTED";
    pub const SYSTEMS_PUSH_KEYS_SUCCESS: &str = "SYSTEMS_PUSH_KEYS_SUCCESS";
    pub const SYSTEMS_PUSH_KEYS_ERROR: &str = "SYSTEMS_PUSH_KEYS_ERROR";

    pub const FETCH_FILES: &str = "FETCH_FILES";
    pub const FETCH_FILES_MODAL: &str = "FETCH_FILES_MODAL";
    pub const DATA_FILES_SET_LOADING: &str = "DATA_FILES_SET_LOADING";
    pub const DATA_FILES_SET_FILES: &str = "DATA_FILES_SET_FILES";
    pub const DATA_FILES_SET_ERROR: &str = "DATA_FILES_SET_ERROR";
    pub const DATA_FILES_TOGGLE_MODAL: &str = "DATA_FILES_TOGGLE_MODAL";
    pub const DATA_FILES_MODAL_CLOSE: &str = "DATA_FILES_MODAL_CLOSE";
    pub const DATA_FILES_SET_OPERATION_STATUS: &str = "DATA_FILES_SET_OPERATION_STATUS";
    pub const DATA_FILES_RENAME: &str = "DATA_FILES_RENAME";
    pub const DATA_FILES_RENAME_SUCCESS: &str = "DATA_FILES_RENAME_SUCCESS";
    pub const DATA_FILES_MOVE: &str = "DATA_FILES_MOVE";
    pub const DATA_FILES_COPY: &str = "DATA_FILES_COPY";
    pub const DATA_FILES_TRASH: &str = "DATA_FILES_TRASH";
    pub const DATA_FILES_DOWNLOAD: &str = "DATA_FILES_DOWNLOAD";
    pub const DATA_FILES_DOWNLOAD_LINK: &str = "DATA_FILES_DOWNLOAD_LINK";

    pub const GET_ALLOCATIONS: &str = "GET_ALLOCATIONS";
    pub const ALLOCATIONS_LOADING: &str = "ALLOCATIONS_LOADING";
    pub const ADD_ALLOCATIONS: &str = "ADD_ALLOCATIONS";
    pub const ALLOCATIONS_ERROR: &str = "ALLOCATIONS_ERROR";
}

/// Props of the systems modal. Opening it for key pushing carries the
/// intent to replay once the keys are in place.
///
/// `system` is whatever the backend named as the execution system: usually
/// an id, sometimes a system definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushKeysProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Box<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<Value>,
}

impl PushKeysProps {
    /// Id of the system to push keys to: the string itself, or the `id` of
    /// a system definition.
    pub fn system_id(&self) -> Option<String> {
        match self.system.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Object(definition) => definition.get("id").and_then(Value::as_str).map(str::to_string),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemsModal {
    pub operation: SystemsOperation,
    #[serde(default)]
    pub props: PushKeysProps,
}

/// Props of a data files modal, in the shape each toolbar button sends:
/// `selectedFile` for rename, `selectedFiles` for move, copy and trash,
/// `file` for showpath. Empty props close the modal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileModalProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_file: Option<FileEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_files: Vec<FileEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileEntry>,
}

impl FileModalProps {
    pub fn is_empty(&self) -> bool {
        self.selected_file.is_none() && self.selected_files.is_empty() && self.file.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesModal {
    pub operation: FileOperation,
    #[serde(default)]
    pub props: FileModalProps,
}

/// Everything that flows through the store: intents raised by the UI and
/// the outcomes and flag updates the sagas emit in response.
///
/// Serialized as `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // Transient indicators
    ShowSpinner,
    HideSpinner,

    // Workspace jobs
    GetJobs {
        params: QueryParams,
    },
    JobsList(Vec<JobEntry>),
    SubmitJob(Value),
    FlushSubmit,
    ToggleSubmitting,
    SubmitJobSuccess(Value),
    SubmitJobError(ApiError),

    // Systems and key pushing
    FetchSystems,
    SystemsList(Vec<SystemListEntry>),
    SystemsListError(ApiError),
    SystemsToggleModal(SystemsModal),
    SystemsPushKeys {
        system_id: String,
        form: PushKeysForm,
        on_success: Option<Box<Action>>,
    },
    SystemsPushKeysStarted,
    SystemsPushKeysSuccess {
        system_id: String,
    },
    SystemsPushKeysError(ApiError),

    // Data files
    FetchFiles {
        params: FileListingParams,
        section: FilesSection,
    },
    /// Listing for the picker inside a modal; the payload is the listing
    /// params themselves.
    FetchFilesModal(FileListingParams),
    DataFilesSetLoading {
        section: FilesSection,
    },
    DataFilesSetFiles {
        section: FilesSection,
        params: FileListingParams,
        listing: FileListing,
    },
    DataFilesSetError {
        section: FilesSection,
        error: ApiError,
    },
    DataFilesToggleModal(FilesModal),
    DataFilesModalClose,
    DataFilesSetOperationStatus {
        operation: FileOperation,
        status: Option<OperationStatus>,
    },
    DataFilesRename {
        file: FileEntry,
        new_name: String,
        params: FileListingParams,
    },
    DataFilesRenameSuccess {
        file: FileEntry,
        new_name: String,
    },
    DataFilesMove {
        files: Vec<FileEntry>,
        dest: Destination,
        params: FileListingParams,
    },
    DataFilesCopy {
        files: Vec<FileEntry>,
        dest: Destination,
        params: FileListingParams,
    },
    DataFilesTrash {
        files: Vec<FileEntry>,
        params: FileListingParams,
    },
    DataFilesDownload {
        file: FileEntry,
        api: String,
        scheme: String,
    },
    DataFilesDownloadLink {
        file: FileEntry,
        href: String,
    },

    // Allocations
    GetAllocations,
    AllocationsLoading,
    AddAllocations(Allocations),
    AllocationsError(ApiError),
}

impl Action {
    /// The wire name watchers match on.
    pub fn action_type(&self) -> &'static str {
        use types::*;

        match self {
            Action::ShowSpinner => SHOW_SPINNER,
            Action::HideSpinner => HIDE_SPINNER,
            Action::GetJobs { .. } => GET_JOBS,
            Action::JobsList(_) => JOBS_LIST,
            Action::SubmitJob(_) => SUBMIT_JOB,
            Action::FlushSubmit => FLUSH_SUBMIT,
            Action::ToggleSubmitting => TOGGLE_SUBMITTING,
            Action::SubmitJobSuccess(_) => SUBMIT_JOB_SUCCESS,
            Action::SubmitJobError(_) => SUBMIT_JOB_ERROR,
            Action::FetchSystems => FETCH_SYSTEMS,
            Action::SystemsList(_) => SYSTEMS_LIST,
            Action::SystemsListError(_) => SYSTEMS_LIST_ERROR,
            Action::SystemsToggleModal(_) => SYSTEMS_TOGGLE_MODAL,
            Action::SystemsPushKeys { .. } => SYSTEMS_PUSH_KEYS,
            Action::SystemsPushKeysStarted => SYSTEMS_PUSH_KEYS_STARTED,
            Action::SystemsPushKeysSuccess { .. } => SYSTEMS_PUSH_KEYS_SUCCESS,
            Action::SystemsPushKeysError(_) => SYSTEMS_PUSH_KEYS_ERROR,
            Action::FetchFiles { .. } => FETCH_FILES,
            Action::FetchFilesModal(_) => FETCH_FILES_MODAL,
            Action::DataFilesSetLoading { .. } => DATA_FILES_SET_LOADING,
            Action::DataFilesSetFiles { .. } => DATA_FILES_SET_FILES,
            Action::DataFilesSetError { .. } => DATA_FILES_SET_ERROR,
            Action::DataFilesToggleModal(_) => DATA_FILES_TOGGLE_MODAL,
            Action::DataFilesModalClose => DATA_FILES_MODAL_CLOSE,
            Action::DataFilesSetOperationStatus { .. } => DATA_FILES_SET_OPERATION_STATUS,
            Action::DataFilesRename { .. } => DATA_FILES_RENAME,
            Action::DataFilesRenameSuccess { .. } => DATA_FILES_RENAME_SUCCESS,
            Action::DataFilesMove { .. } => DATA_FILES_MOVE,
            Action::DataFilesCopy { .. } => DATA_FILES_COPY,
            Action::DataFilesTrash { .. } => DATA_FILES_TRASH,
            Action::DataFilesDownload { .. } => DATA_FILES_DOWNLOAD,
            Action::DataFilesDownloadLink { .. } => DATA_FILES_DOWNLOAD_LINK,
            Action::GetAllocations => GET_ALLOCATIONS,
            Action::AllocationsLoading => ALLOCATIONS_LOADING,
            Action::AddAllocations(_) => ADD_ALLOCATIONS,
            Action::AllocationsError(_) => ALLOCATIONS_ERROR,
        }
    }

    /// Opening the key-push modal for `system`, replaying `on_success` afterwards.
    pub fn open_push_keys(system: Value, on_success: Action) -> Self {
        Action::SystemsToggleModal(SystemsModal {
            operation: SystemsOperation::PushKeys,
            props: PushKeysProps {
                on_success: Some(Box::new(on_success)),
                system: Some(system),
            },
        })
    }

    /// Closing the key-push modal.
    pub fn close_push_keys() -> Self {
        Action::SystemsToggleModal(SystemsModal {
            operation: SystemsOperation::PushKeys,
            props: PushKeysProps::default(),
        })
    }

    pub fn operation_status(operation: FileOperation, status: OperationStatus) -> Self {
        Action::DataFilesSetOperationStatus {
            operation,
            status: Some(status),
        }
    }
}
