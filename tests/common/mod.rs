#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use portal::api::{ApiError, Destination, FileTarget, PortalApi, QueryParams};
use portal::cookies::CookieJar;
use portal::entities::{
    Allocations, FileEntry, FileListing, FileListingParams, JobEntry, PushKeysForm, SystemListEntry,
};
use portal::orchestrator::{configure_store, SagaContext};
use portal::store::{Action, Store};

/// One backend call seen by [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub key: String,
    pub csrf_token: Option<String>,
}

struct Reply {
    result: Result<Value, ApiError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// In-process [`PortalApi`] with scripted replies.
///
/// Replies are queued per method, optionally for a specific call key (the
/// query string, file path or system id). A gated reply waits until its
/// sender fires, which lets tests hold a call in flight.
#[derive(Default)]
pub struct MockApi {
    replies: Mutex<HashMap<(&'static str, Option<String>), VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: &'static str, key: Option<&str>, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry((method, key.map(str::to_string)))
            .or_default()
            .push_back(reply);
    }

    pub fn reply(&self, method: &'static str, result: Result<Value, ApiError>) {
        self.push(method, None, Reply { result, gate: None });
    }

    pub fn reply_for(&self, method: &'static str, key: &str, result: Result<Value, ApiError>) {
        self.push(method, Some(key), Reply { result, gate: None });
    }

    /// Queue a reply that is held until the returned sender fires.
    pub fn reply_gated(&self, method: &'static str, key: Option<&str>, result: Result<Value, ApiError>) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.push(
            method,
            key,
            Reply {
                result,
                gate: Some(gate),
            },
        );
        release
    }

    pub fn calls(&self, method: &str) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    fn take_reply(&self, method: &'static str, key: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        if let Some(reply) = replies.get_mut(&(method, Some(key.to_string()))).and_then(VecDeque::pop_front) {
            return Some(reply);
        }
        replies.get_mut(&(method, None)).and_then(VecDeque::pop_front)
    }

    async fn answer<T: DeserializeOwned>(
        &self,
        method: &'static str,
        key: String,
        csrf_token: Option<&str>,
    ) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(Call {
            method,
            key: key.clone(),
            csrf_token: csrf_token.map(str::to_string),
        });

        let reply = self
            .take_reply(method, &key)
            .ok_or_else(|| ApiError::Transport(format!("no reply scripted for {} {}", method, key)))?;
        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        let value = reply.result?;
        Ok(serde_json::from_value(value)?)
    }
}

fn query_key(params: &QueryParams) -> String {
    params
        .to_pairs()
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl PortalApi for MockApi {
    async fn list_jobs(&self, params: &QueryParams) -> Result<Vec<JobEntry>, ApiError> {
        self.answer("list_jobs", query_key(params), None).await
    }

    async fn submit_job(&self, job: &Value, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.answer("submit_job", job.to_string(), csrf_token).await
    }

    async fn list_files(&self, params: &FileListingParams) -> Result<FileListing, ApiError> {
        self.answer("list_files", params.path.clone(), None).await
    }

    async fn rename_file(&self, target: &FileTarget, _new_name: &str, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.answer("rename_file", target.path.clone(), csrf_token).await
    }

    async fn move_file(&self, target: &FileTarget, _dest: &Destination, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.answer("move_file", target.path.clone(), csrf_token).await
    }

    async fn copy_file(&self, target: &FileTarget, _dest: &Destination, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.answer("copy_file", target.path.clone(), csrf_token).await
    }

    async fn trash_file(&self, target: &FileTarget, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.answer("trash_file", target.path.clone(), csrf_token).await
    }

    async fn download_link(&self, target: &FileTarget, csrf_token: Option<&str>) -> Result<String, ApiError> {
        self.answer("download_link", target.path.clone(), csrf_token).await
    }

    async fn fetch_allocations(&self) -> Result<Allocations, ApiError> {
        self.answer("fetch_allocations", String::new(), None).await
    }

    async fn list_systems(&self) -> Result<Vec<SystemListEntry>, ApiError> {
        self.answer("list_systems", String::new(), None).await
    }

    async fn push_keys(&self, system_id: &str, _form: &PushKeysForm, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.answer("push_keys", system_id.to_string(), csrf_token).await
    }
}

pub fn store_with(api: Arc<MockApi>, cookies: CookieJar) -> Store {
    configure_store(SagaContext::new(api, cookies))
}

pub fn cookies_with_token(token: &str) -> CookieJar {
    CookieJar::parse(&format!("sessionid=s3ss10n; csrftoken={}", token))
}

/// Pump the store until `done` matches, failing the test after a few seconds.
pub async fn run_until<F>(store: &mut Store, done: F) -> Vec<Action>
where
    F: FnMut(&Action) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), store.run_until(done))
        .await
        .expect("store did not reach the expected action in time")
}

/// Let spawned tasks run, then dispatch whatever they queued.
pub async fn settle(store: &mut Store) -> Vec<Action> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.drain()
}

pub fn types_of(actions: &[Action]) -> Vec<&'static str> {
    actions.iter().map(Action::action_type).collect()
}

pub fn count(actions: &[Action], action_type: &str) -> usize {
    actions.iter().filter(|a| a.action_type() == action_type).count()
}

pub fn job(id: &str) -> Value {
    json!({ "id": id, "name": format!("job {}", id), "status": "FINISHED" })
}

pub fn file(name: &str, format: &str) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        path: format!("/home/user/{}", name),
        system: "frontera.home.user".to_string(),
        format: format.to_string(),
        length: None,
        last_modified: None,
        extra: Default::default(),
    }
}

pub fn listing_params(path: &str) -> FileListingParams {
    FileListingParams {
        api: "tapis".to_string(),
        scheme: "private".to_string(),
        system: "frontera.home.user".to_string(),
        path: path.to_string(),
        offset: 0,
        limit: 100,
    }
}
