//! Endpoint paths of the portal backend.
//!
//! A route is a list of path segments. Segments are percent-encoded when the
//! URL is built, so file names containing `#`, `?` or spaces stay one segment.

use reqwest::Url;

use crate::constants::{
    ALLOCATIONS_ENDPOINT, DATAFILES_ENDPOINT, JOBS_ENDPOINT, SYSTEMS_LIST_ENDPOINT, SYSTEM_KEYS_ENDPOINT,
};

use super::{ApiError, FileTarget, QueryParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(Vec<String>);

impl Route {
    /// A fixed endpoint such as `/api/users/allocations/`. A trailing slash
    /// is kept as an empty last segment.
    fn endpoint(path: &str) -> Self {
        Self(path.trim_start_matches('/').split('/').map(str::to_string).collect())
    }

    fn push(mut self, segment: &str) -> Self {
        self.0.push(segment.to_string());
        self
    }

    /// Append a slash separated path, one segment per component.
    fn push_path(mut self, path: &str) -> Self {
        self.0.extend(path.trim_start_matches('/').split('/').map(str::to_string));
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

pub fn jobs() -> Route {
    Route::endpoint(JOBS_ENDPOINT)
}

pub fn allocations() -> Route {
    Route::endpoint(ALLOCATIONS_ENDPOINT)
}

pub fn systems_list() -> Route {
    Route::endpoint(SYSTEMS_LIST_ENDPOINT)
}

/// `/api/datafiles/<api>/<operation>/<scheme>/<system>/<path>`
pub fn datafiles(operation: &str, target: &FileTarget) -> Route {
    Route::endpoint(DATAFILES_ENDPOINT)
        .push(&target.api)
        .push(operation)
        .push(&target.scheme)
        .push(&target.system)
        .push_path(&target.path)
}

pub fn system_keys(system_id: &str) -> Route {
    Route::endpoint(SYSTEM_KEYS_ENDPOINT).push(system_id).push("keys").push("")
}

/// Append `route` to `base` and add the non-empty query parameters.
///
/// The base may carry a path prefix (`https://host/portal`); it is kept.
pub fn build_url(base: &str, route: &Route, query: &QueryParams) -> Result<Url, ApiError> {
    let mut url = Url::parse(base).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidRequest(format!("{}: not a base URL", base)))?
        .pop_if_empty()
        .extend(route.segments());

    let pairs = query.to_pairs();
    if !pairs.is_empty() {
        let mut serializer = url.query_pairs_mut();
        for (key, value) in &pairs {
            serializer.append_pair(key, value);
        }
    }

    Ok(url)
}
