use log::{debug, info, warn};
use serde_json::Value;

use super::{SagaContext, TaskScope};
use crate::api::{ApiError, Destination, FileTarget};
use crate::entities::{is_valid_file_name, FileEntry, FileListingParams, FileOperation, FilesSection, OperationStatus};
use crate::store::{Action, FileModalProps, FilesModal};

/// Load one listing. Main browser and modal picker are keyed apart, so a
/// newer request only supersedes one for the same section.
pub async fn fetch_files(ctx: SagaContext, action: Action, scope: TaskScope) {
    let Action::FetchFiles { params, section } = action else {
        return;
    };

    scope.put(Action::DataFilesSetLoading { section });

    match ctx.api.list_files(&params).await {
        Ok(listing) => {
            scope.deliver(Action::DataFilesSetFiles {
                section,
                params,
                listing,
            });
        }
        Err(e) => {
            warn!("Failed to list {}:{}: {}", params.system, params.path, e);
            scope.deliver(Action::DataFilesSetError { section, error: e });
        }
    }
}

/// The picker inside modals asks for its listing with `FETCH_FILES_MODAL`;
/// it runs as a modal-section fetch.
pub async fn fetch_files_modal(_ctx: SagaContext, action: Action, scope: TaskScope) {
    if let Action::FetchFilesModal(params) = action {
        scope.put(Action::FetchFiles {
            params,
            section: FilesSection::Modal,
        });
    }
}

fn close_modal(operation: FileOperation) -> Action {
    Action::DataFilesToggleModal(FilesModal {
        operation,
        props: FileModalProps::default(),
    })
}

fn refresh(params: FileListingParams) -> Action {
    Action::FetchFiles {
        params,
        section: FilesSection::FilesListing,
    }
}

pub async fn rename(ctx: SagaContext, action: Action, scope: TaskScope) {
    let Action::DataFilesRename {
        file,
        new_name,
        params,
    } = action
    else {
        return;
    };

    if !is_valid_file_name(&new_name) {
        warn!("Refusing to rename {} to invalid name {:?}", file.path, new_name);
        scope.finish(Action::operation_status(FileOperation::Rename, OperationStatus::Error));
        return;
    }

    scope.put(Action::operation_status(FileOperation::Rename, OperationStatus::Running));

    let target = FileTarget::new(&params.api, &params.scheme, &file);
    let token = ctx.csrf_token();
    match ctx.api.rename_file(&target, &new_name, token.as_deref()).await {
        Ok(_) => {
            info!("Renamed {} to {}", file.path, new_name);
            scope.put(Action::operation_status(FileOperation::Rename, OperationStatus::Success));
            scope.put(Action::DataFilesRenameSuccess { file, new_name });
            scope.put(close_modal(FileOperation::Rename));
            scope.finish(refresh(params));
        }
        Err(e) => {
            warn!("Rename of {} failed: {}", file.path, e);
            scope.finish(Action::operation_status(FileOperation::Rename, OperationStatus::Error));
        }
    }
}

#[derive(Clone, Copy)]
enum Batch<'a> {
    Move(&'a Destination),
    Copy(&'a Destination),
    Trash,
}

impl Batch<'_> {
    fn operation(&self) -> FileOperation {
        match self {
            Batch::Move(_) => FileOperation::Move,
            Batch::Copy(_) => FileOperation::Copy,
            Batch::Trash => FileOperation::Trash,
        }
    }

    async fn apply(&self, ctx: &SagaContext, target: &FileTarget, token: Option<&str>) -> Result<Value, ApiError> {
        match self {
            Batch::Move(dest) => ctx.api.move_file(target, dest, token).await,
            Batch::Copy(dest) => ctx.api.copy_file(target, dest, token).await,
            Batch::Trash => ctx.api.trash_file(target, token).await,
        }
    }
}

/// Apply `batch` to each file in order, stopping at the first failure.
///
/// The listing is refreshed either way: files handled before a failure have
/// already changed on the backend.
async fn run_batch(ctx: &SagaContext, scope: &TaskScope, batch: Batch<'_>, files: &[FileEntry], params: FileListingParams) {
    let operation = batch.operation();
    if files.is_empty() {
        debug!("Nothing selected to {}", operation.as_str());
        return;
    }

    scope.put(Action::operation_status(operation, OperationStatus::Running));

    let token = ctx.csrf_token();
    for file in files {
        let target = FileTarget::new(&params.api, &params.scheme, file);
        if let Err(e) = batch.apply(ctx, &target, token.as_deref()).await {
            warn!("Failed to {} {}: {}", operation.as_str(), file.path, e);
            scope.put(Action::operation_status(operation, OperationStatus::Error));
            scope.finish(refresh(params));
            return;
        }
    }

    info!("{} {} file(s)", operation.as_str(), files.len());
    scope.put(Action::operation_status(operation, OperationStatus::Success));
    scope.put(close_modal(operation));
    scope.put(Action::DataFilesModalClose);
    scope.finish(refresh(params));
}

pub async fn move_files(ctx: SagaContext, action: Action, scope: TaskScope) {
    if let Action::DataFilesMove { files, dest, params } = action {
        run_batch(&ctx, &scope, Batch::Move(&dest), &files, params).await;
    }
}

pub async fn copy_files(ctx: SagaContext, action: Action, scope: TaskScope) {
    if let Action::DataFilesCopy { files, dest, params } = action {
        run_batch(&ctx, &scope, Batch::Copy(&dest), &files, params).await;
    }
}

pub async fn trash_files(ctx: SagaContext, action: Action, scope: TaskScope) {
    if let Action::DataFilesTrash { files, params } = action {
        run_batch(&ctx, &scope, Batch::Trash, &files, params).await;
    }
}

/// Resolve a temporary download link for one file.
pub async fn download(ctx: SagaContext, action: Action, scope: TaskScope) {
    let Action::DataFilesDownload { file, api, scheme } = action else {
        return;
    };

    if file.is_folder() {
        warn!("Folders cannot be downloaded: {}", file.path);
        scope.put(Action::operation_status(FileOperation::Download, OperationStatus::Error));
        return;
    }

    let target = FileTarget::new(&api, &scheme, &file);
    let token = ctx.csrf_token();
    match ctx.api.download_link(&target, token.as_deref()).await {
        Ok(href) => scope.put(Action::DataFilesDownloadLink { file, href }),
        Err(e) => {
            warn!("No download link for {}: {}", file.path, e);
            scope.put(Action::operation_status(FileOperation::Download, OperationStatus::Error));
        }
    }
}
