//! Single-writer UI store.
//!
//! Every action, whether raised by the UI or emitted by a running task, goes
//! through [`Store::dispatch`]: the reducer applies it to [`AppState`] first,
//! then the task manager starts whatever tasks watch for it. Tasks never touch
//! the state; they only queue actions, which the store drains one at a time.

pub mod actions;
pub mod state;

pub use actions::{types, Action, FileModalProps, FilesModal, PushKeysProps, SystemsModal};
pub use state::{AllocationsState, AppState, FilesState, JobsState, SectionListing, SubmitState, SystemsState};

use log::debug;
use tokio::sync::mpsc;

use crate::orchestrator::task_manager::{Dispatcher, Envelope, TaskManager};

pub struct Store {
    state: AppState,
    tasks: TaskManager,
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl Store {
    pub fn new(tasks: TaskManager, receiver: mpsc::UnboundedReceiver<Envelope>) -> Self {
        Self {
            state: AppState::default(),
            tasks,
            receiver,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle for queueing actions from outside the store.
    pub fn dispatcher(&self) -> Dispatcher {
        self.tasks.dispatcher()
    }

    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    /// Reduce `action`, then start the tasks watching for it.
    pub fn dispatch(&mut self, action: Action) {
        debug!("dispatch {}", action.action_type());
        self.state.reduce(&action);
        self.tasks.route(&action);
    }

    fn accept(&mut self, envelope: Envelope) -> Option<Action> {
        if envelope.is_stale() {
            debug!("Dropping stale {}", envelope.action().action_type());
            return None;
        }
        let action = envelope.into_action();
        self.dispatch(action.clone());
        Some(action)
    }

    /// Wait for the next queued action and dispatch it.
    ///
    /// Outcomes of superseded tasks are dropped here without reaching the
    /// reducer. The store keeps a sender alive, so this waits forever when
    /// nothing is in flight; callers bound it with a timeout.
    pub async fn process_next(&mut self) -> Option<Action> {
        loop {
            let envelope = self.receiver.recv().await?;
            if let Some(action) = self.accept(envelope) {
                return Some(action);
            }
        }
    }

    /// Dispatch everything already queued, without waiting.
    pub fn drain(&mut self) -> Vec<Action> {
        let mut processed = Vec::new();
        while let Ok(envelope) = self.receiver.try_recv() {
            if let Some(action) = self.accept(envelope) {
                processed.push(action);
            }
        }
        processed
    }

    /// Process queued actions until one satisfies `done`; returns everything
    /// processed, the matching action last.
    pub async fn run_until<F>(&mut self, mut done: F) -> Vec<Action>
    where
        F: FnMut(&Action) -> bool,
    {
        let mut processed = Vec::new();
        while let Some(action) = self.process_next().await {
            let finished = done(&action);
            processed.push(action);
            if finished {
                break;
            }
        }
        processed
    }
}
