//! Sagas: the tasks that turn intents into backend calls and outcome actions.
//!
//! Each saga is an async function of the action that triggered it, a
//! [`SagaContext`] and the [`TaskScope`] it emits through. [`root_watchers`]
//! binds every saga to the action type it handles under the scheduling policy
//! that family needs.

pub mod allocations;
pub mod files;
pub mod jobs;
pub mod systems;
pub mod task_manager;

use std::future::Future;
use std::sync::Arc;

use crate::api::PortalApi;
use crate::constants::CSRF_COOKIE;
use crate::cookies::CookieJar;
use crate::store::{types, Action, Store};

pub use task_manager::{
    take_every, take_latest, take_latest_by, take_leading, Dispatcher, Envelope, Policy, TaskManager, TaskScope,
    Watcher,
};

/// What every saga needs from the outside world.
#[derive(Clone)]
pub struct SagaContext {
    pub api: Arc<dyn PortalApi>,
    pub cookies: CookieJar,
    csrf_cookie_name: String,
}

impl SagaContext {
    pub fn new(api: Arc<dyn PortalApi>, cookies: CookieJar) -> Self {
        Self {
            api,
            cookies,
            csrf_cookie_name: CSRF_COOKIE.to_string(),
        }
    }

    pub fn with_csrf_cookie_name(mut self, name: &str) -> Self {
        self.csrf_cookie_name = name.to_string();
        self
    }

    /// Current CSRF token. Read per call: responses may rotate it.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookies.get(&self.csrf_cookie_name)
    }
}

/// Adapt a saga taking a context into a watcher task.
fn with_context<F, Fut>(ctx: &SagaContext, saga: F) -> impl Fn(Action, TaskScope) -> Fut + Send + Sync + 'static
where
    F: Fn(SagaContext, Action, TaskScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let ctx = ctx.clone();
    move |action: Action, scope: TaskScope| saga(ctx.clone(), action, scope)
}

fn files_section_key(action: &Action) -> String {
    match action {
        Action::FetchFiles { section, .. } => format!("{:?}", section),
        _ => String::new(),
    }
}

/// Every watcher the portal runs.
pub fn root_watchers(ctx: &SagaContext) -> Vec<Watcher> {
    vec![
        take_latest(types::GET_JOBS, with_context(ctx, jobs::get_jobs)),
        take_leading(types::SUBMIT_JOB, with_context(ctx, jobs::submit_job)),
        take_latest(types::FETCH_SYSTEMS, with_context(ctx, systems::fetch_systems)),
        take_leading(types::SYSTEMS_PUSH_KEYS, with_context(ctx, systems::push_keys)),
        take_latest_by(types::FETCH_FILES, files_section_key, with_context(ctx, files::fetch_files)),
        take_every(types::FETCH_FILES_MODAL, with_context(ctx, files::fetch_files_modal)),
        take_leading(types::DATA_FILES_RENAME, with_context(ctx, files::rename)),
        take_leading(types::DATA_FILES_MOVE, with_context(ctx, files::move_files)),
        take_leading(types::DATA_FILES_COPY, with_context(ctx, files::copy_files)),
        take_leading(types::DATA_FILES_TRASH, with_context(ctx, files::trash_files)),
        take_every(types::DATA_FILES_DOWNLOAD, with_context(ctx, files::download)),
        take_latest(types::GET_ALLOCATIONS, with_context(ctx, allocations::get_allocations)),
    ]
}

/// A store with every watcher registered. Dispatching starts tokio tasks, so
/// the store must be driven from within a runtime.
pub fn configure_store(ctx: SagaContext) -> Store {
    let (mut tasks, receiver) = TaskManager::new();
    for watcher in root_watchers(&ctx) {
        tasks.register(watcher);
    }
    Store::new(tasks, receiver)
}
