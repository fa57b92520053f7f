use std::collections::HashMap;

use serde_json::Value;

use crate::api::ApiError;
use crate::entities::{
    Allocations, FileEntry, FileListingParams, FileOperation, FilesSection, JobEntry, OperationStatus,
    SystemListEntry,
};

use super::actions::{Action, FileModalProps, PushKeysProps};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitState {
    pub submitting: bool,
    pub response: Option<Value>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobsState {
    pub list: Vec<JobEntry>,
    pub submit: SubmitState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemsState {
    pub list: Vec<SystemListEntry>,
    pub list_error: Option<ApiError>,
    pub push_keys_open: bool,
    pub push_keys_props: PushKeysProps,
    pub pushing: bool,
    pub push_error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionListing {
    pub params: Option<FileListingParams>,
    pub files: Vec<FileEntry>,
    pub reached_end: bool,
    pub loading: bool,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilesState {
    pub listings: HashMap<FilesSection, SectionListing>,
    pub modals: HashMap<FileOperation, bool>,
    pub modal_props: HashMap<FileOperation, FileModalProps>,
    pub operation_status: HashMap<FileOperation, OperationStatus>,
    pub download_href: Option<String>,
}

impl FilesState {
    pub fn listing(&self, section: FilesSection) -> Option<&SectionListing> {
        self.listings.get(&section)
    }

    pub fn is_modal_open(&self, operation: FileOperation) -> bool {
        self.modals.get(&operation).copied().unwrap_or(false)
    }

    pub fn status(&self, operation: FileOperation) -> Option<OperationStatus> {
        self.operation_status.get(&operation).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationsState {
    pub allocations: Allocations,
    pub loading: bool,
    pub error: Option<ApiError>,
}

/// All shared UI state. Only [`AppState::reduce`] mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    spinner_depth: u32,
    pub jobs: JobsState,
    pub systems: SystemsState,
    pub files: FilesState,
    pub allocations: AllocationsState,
}

impl AppState {
    /// The spinner shows while any fetch that raised it is still running,
    /// superseded ones included.
    pub fn spinner_visible(&self) -> bool {
        self.spinner_depth > 0
    }

    pub fn spinner_depth(&self) -> u32 {
        self.spinner_depth
    }

    /// Absolute storage path shown by the showpath modal. None while the
    /// modal is closed or the file's system is not in the systems list.
    pub fn show_path(&self) -> Option<String> {
        if !self.files.is_modal_open(FileOperation::ShowPath) {
            return None;
        }
        let file = self.files.modal_props.get(&FileOperation::ShowPath)?.file.as_ref()?;
        file.storage_path(&self.systems.list)
    }

    pub fn reduce(&mut self, action: &Action) {
        match action {
            Action::ShowSpinner => self.spinner_depth += 1,
            Action::HideSpinner => self.spinner_depth = self.spinner_depth.saturating_sub(1),

            Action::JobsList(list) => self.jobs.list = list.clone(),
            Action::FlushSubmit => self.jobs.submit = SubmitState::default(),
            Action::ToggleSubmitting => self.jobs.submit.submitting = !self.jobs.submit.submitting,
            Action::SubmitJobSuccess(response) => {
                self.jobs.submit.submitting = false;
                self.jobs.submit.response = Some(response.clone());
                self.jobs.submit.error = None;
            }
            Action::SubmitJobError(error) => {
                self.jobs.submit.submitting = false;
                self.jobs.submit.error = Some(error.clone());
            }

            Action::SystemsList(list) => {
                self.systems.list = list.clone();
                self.systems.list_error = None;
            }
            Action::SystemsListError(error) => self.systems.list_error = Some(error.clone()),
            // Props naming a system open the modal, empty props close it.
            Action::SystemsToggleModal(modal) => {
                self.systems.push_keys_open = modal.props.system.is_some();
                self.systems.push_keys_props = modal.props.clone();
                if self.systems.push_keys_open {
                    self.systems.push_error = None;
                }
            }
            Action::SystemsPushKeysStarted => {
                self.systems.pushing = true;
                self.systems.push_error = None;
            }
            Action::SystemsPushKeysSuccess { .. } => self.systems.pushing = false,
            Action::SystemsPushKeysError(error) => {
                self.systems.pushing = false;
                self.systems.push_error = Some(error.clone());
            }

            Action::DataFilesSetLoading { section } => {
                let listing = self.files.listings.entry(*section).or_default();
                listing.loading = true;
                listing.error = None;
            }
            Action::DataFilesSetFiles {
                section,
                params,
                listing,
            } => {
                let entry = self.files.listings.entry(*section).or_default();
                entry.loading = false;
                entry.error = None;
                entry.params = Some(params.clone());
                entry.files = listing.listing.clone();
                entry.reached_end = listing.reached_end;
            }
            Action::DataFilesSetError { section, error } => {
                let entry = self.files.listings.entry(*section).or_default();
                entry.loading = false;
                entry.files.clear();
                entry.error = Some(error.clone());
            }
            // Props naming files open the modal, empty props close it.
            Action::DataFilesToggleModal(modal) => {
                let open = !modal.props.is_empty();
                self.files.modals.insert(modal.operation, open);
                self.files.modal_props.insert(modal.operation, modal.props.clone());
            }
            Action::DataFilesModalClose => {
                self.files.listings.remove(&FilesSection::Modal);
            }
            Action::DataFilesSetOperationStatus { operation, status } => match status {
                Some(status) => {
                    self.files.operation_status.insert(*operation, *status);
                }
                None => {
                    self.files.operation_status.remove(operation);
                }
            },
            Action::DataFilesDownloadLink { href, .. } => self.files.download_href = Some(href.clone()),

            Action::AllocationsLoading => {
                self.allocations.loading = true;
                self.allocations.error = None;
            }
            Action::AddAllocations(allocations) => {
                self.allocations.allocations = allocations.clone();
                self.allocations.loading = false;
                self.allocations.error = None;
            }
            Action::AllocationsError(error) => {
                self.allocations.loading = false;
                self.allocations.error = Some(error.clone());
            }

            // Intents and pure notifications leave the state alone.
            Action::GetJobs { .. }
            | Action::SubmitJob(_)
            | Action::FetchSystems
            | Action::SystemsPushKeys { .. }
            | Action::FetchFiles { .. }
            | Action::FetchFilesModal(_)
            | Action::DataFilesRename { .. }
            | Action::DataFilesRenameSuccess { .. }
            | Action::DataFilesMove { .. }
            | Action::DataFilesCopy { .. }
            | Action::DataFilesTrash { .. }
            | Action::DataFilesDownload { .. }
            | Action::GetAllocations => {}
        }
    }
}
