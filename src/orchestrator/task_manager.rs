use futures::future::{BoxFuture, FutureExt};
use log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::store::Action;

pub type TaskId = u64;

/// Marks an outcome as belonging to one run of a latest-wins family.
#[derive(Debug, Clone)]
struct Freshness {
    counter: Arc<AtomicU64>,
    generation: u64,
}

impl Freshness {
    fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.generation
    }
}

/// An action on its way to the store.
#[derive(Debug)]
pub struct Envelope {
    action: Action,
    freshness: Option<Freshness>,
}

impl Envelope {
    pub fn new(action: Action) -> Self {
        Self { action, freshness: None }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// True once a newer run of the task that produced it has started.
    pub fn is_stale(&self) -> bool {
        self.freshness.as_ref().is_some_and(|f| !f.is_current())
    }

    pub fn into_action(self) -> Action {
        self.action
    }
}

/// Sends actions into the store's queue.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    sender: mpsc::UnboundedSender<Envelope>,
}

impl Dispatcher {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn put(&self, action: Action) {
        self.send(Envelope::new(action));
    }

    fn send(&self, envelope: Envelope) {
        if self.sender.send(envelope).is_err() {
            debug!("Store is gone, dropping action");
        }
    }
}

/// What a running task emits through.
///
/// `put` always reaches the store; it is for flags that must be cleared no
/// matter what. `deliver` is for outcomes: in a latest-wins family they are
/// dropped once the task has been superseded. `finish` emits a task's last
/// action and frees its leading watcher first.
#[derive(Debug, Clone)]
pub struct TaskScope {
    dispatcher: Dispatcher,
    freshness: Option<Freshness>,
    slot: Option<Arc<LeadingSlot>>,
}

impl TaskScope {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            freshness: None,
            slot: None,
        }
    }

    fn latest(dispatcher: Dispatcher, counter: Arc<AtomicU64>, generation: u64) -> Self {
        Self {
            dispatcher,
            freshness: Some(Freshness { counter, generation }),
            slot: None,
        }
    }

    fn leading(dispatcher: Dispatcher, slot: Arc<LeadingSlot>) -> Self {
        Self {
            dispatcher,
            freshness: None,
            slot: Some(slot),
        }
    }

    pub fn is_current(&self) -> bool {
        self.freshness.as_ref().map_or(true, Freshness::is_current)
    }

    pub fn put(&self, action: Action) {
        self.dispatcher.put(action);
    }

    /// Put the task's terminal action. A leading watcher accepts new actions
    /// from here on, so one dispatched in reaction to `action` is not dropped.
    pub fn finish(&self, action: Action) {
        if let Some(slot) = &self.slot {
            slot.release();
        }
        self.put(action);
    }

    /// Emit an outcome. Returns false when it was dropped as superseded.
    pub fn deliver(&self, action: Action) -> bool {
        if !self.is_current() {
            debug!("Discarding superseded {}", action.action_type());
            return false;
        }
        self.dispatcher.send(Envelope {
            action,
            freshness: self.freshness.clone(),
        });
        true
    }
}

/// How a watcher schedules tasks for the actions it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// A task per action.
    Every,
    /// A task per action; only the newest may deliver outcomes.
    Latest,
    /// One task at a time; actions arriving while it runs are dropped.
    Leading,
}

type Worker = Arc<dyn Fn(Action, TaskScope) -> BoxFuture<'static, ()> + Send + Sync>;
type KeyFn = fn(&Action) -> String;

/// Runs a task function for every action of one type, under a [`Policy`].
pub struct Watcher {
    pattern: &'static str,
    policy: Policy,
    key: Option<KeyFn>,
    worker: Worker,
    generations: HashMap<String, Arc<AtomicU64>>,
    busy: Arc<AtomicBool>,
}

impl Watcher {
    fn new<F, Fut>(pattern: &'static str, policy: Policy, key: Option<KeyFn>, task: F) -> Self
    where
        F: Fn(Action, TaskScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let worker: Worker =
            Arc::new(move |action: Action, scope: TaskScope| -> BoxFuture<'static, ()> { task(action, scope).boxed() });
        Self {
            pattern,
            policy,
            key,
            worker,
            generations: HashMap::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Whether a leading task is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn matches(&self, action: &Action) -> bool {
        action.action_type() == self.pattern
    }
}

/// Start a task for every `pattern` action.
pub fn take_every<F, Fut>(pattern: &'static str, task: F) -> Watcher
where
    F: Fn(Action, TaskScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Watcher::new(pattern, Policy::Every, None, task)
}

/// Start a task for every `pattern` action; a newer one supersedes the older.
pub fn take_latest<F, Fut>(pattern: &'static str, task: F) -> Watcher
where
    F: Fn(Action, TaskScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Watcher::new(pattern, Policy::Latest, None, task)
}

/// Like [`take_latest`], but supersession only happens between actions with
/// the same `key`.
pub fn take_latest_by<F, Fut>(pattern: &'static str, key: KeyFn, task: F) -> Watcher
where
    F: Fn(Action, TaskScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Watcher::new(pattern, Policy::Latest, Some(key), task)
}

/// Start a task for a `pattern` action unless one is already running.
pub fn take_leading<F, Fut>(pattern: &'static str, task: F) -> Watcher
where
    F: Fn(Action, TaskScope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Watcher::new(pattern, Policy::Leading, None, task)
}

/// One task's hold on a leading watcher. Released once, by whichever of
/// [`TaskScope::finish`] or the end of the task comes first.
#[derive(Debug)]
struct LeadingSlot {
    busy: Arc<AtomicBool>,
    held: AtomicBool,
}

impl LeadingSlot {
    fn acquire(busy: &Arc<AtomicBool>) -> Option<Arc<Self>> {
        if busy.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Arc::new(Self {
            busy: busy.clone(),
            held: AtomicBool::new(true),
        }))
    }

    fn release(&self) {
        if self.held.swap(false, Ordering::SeqCst) {
            self.busy.store(false, Ordering::SeqCst);
        }
    }
}

/// Releases a leading watcher when its task ends, aborted tasks and tasks
/// returning early included.
struct BusyGuard(Arc<LeadingSlot>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

#[derive(Debug)]
pub struct BackgroundTask {
    pub id: TaskId,
    pub handle: JoinHandle<()>,
    pub description: String,
    pub started_at: std::time::Instant,
}

pub struct TaskManager {
    watchers: Vec<Watcher>,
    tasks: HashMap<TaskId, BackgroundTask>,
    next_task_id: TaskId,
    dispatcher: Dispatcher,
}

impl TaskManager {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (dispatcher, receiver) = Dispatcher::channel();

        (
            Self {
                watchers: Vec::new(),
                tasks: HashMap::new(),
                next_task_id: 1,
                dispatcher,
            },
            receiver,
        )
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn register(&mut self, watcher: Watcher) {
        self.watchers.push(watcher);
    }

    pub fn watchers(&self) -> &[Watcher] {
        &self.watchers
    }

    /// Start the tasks `action` triggers. Must be called from a tokio runtime.
    pub fn route(&mut self, action: &Action) -> Vec<TaskId> {
        self.cleanup_finished_tasks();

        let mut spawned = Vec::new();
        for index in 0..self.watchers.len() {
            if !self.watchers[index].matches(action) {
                continue;
            }

            let watcher = &mut self.watchers[index];
            let pattern = watcher.pattern;
            let worker = watcher.worker.clone();
            let mut guard = None;

            let scope = match watcher.policy {
                Policy::Every => TaskScope::new(self.dispatcher.clone()),
                Policy::Latest => {
                    let key = watcher.key.map(|key| key(action)).unwrap_or_default();
                    let counter = watcher.generations.entry(key).or_default().clone();
                    let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    TaskScope::latest(self.dispatcher.clone(), counter, generation)
                }
                Policy::Leading => {
                    let Some(slot) = LeadingSlot::acquire(&watcher.busy) else {
                        debug!("Ignoring {}: previous task still running", pattern);
                        continue;
                    };
                    guard = Some(BusyGuard(slot.clone()));
                    TaskScope::leading(self.dispatcher.clone(), slot)
                }
            };

            let action = action.clone();
            let future = async move {
                let _guard = guard;
                worker(action, scope).await;
            };
            spawned.push(self.spawn(pattern.to_string(), future));
        }

        spawned
    }

    fn spawn<Fut>(&mut self, description: String, future: Fut) -> TaskId
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let task = BackgroundTask {
            id: task_id,
            handle: tokio::spawn(future),
            description,
            started_at: std::time::Instant::now(),
        };

        self.tasks.insert(task_id, task);
        task_id
    }

    /// Forget tasks that have finished; returns their ids
    pub fn cleanup_finished_tasks(&mut self) -> Vec<TaskId> {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        for task_id in &finished {
            self.tasks.remove(task_id);
        }

        finished
    }

    /// Abort every running task
    pub fn cancel_all_tasks(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.handle.abort();
        }
    }

    /// Number of tasks not yet reaped by [`TaskManager::cleanup_finished_tasks`]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        // Cancel all tasks when the manager is dropped
        self.cancel_all_tasks();
    }
}
