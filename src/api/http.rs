//! reqwest implementation of [`PortalApi`].

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::constants::CSRF_HEADER;
use crate::cookies::CookieJar;
use crate::entities::{Allocations, FileListing, FileListingParams, JobEntry, PushKeysForm, SystemListEntry};

use super::routes::{self, build_url, Route};
use super::{ApiError, Destination, FileTarget, PortalApi, QueryParams};

/// `{"response": ...}` bodies of the workspace and accounts endpoints.
#[derive(Deserialize)]
struct ResponseEnvelope<T> {
    response: T,
}

/// `{"data": ...}` bodies of the data files endpoints.
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct DownloadLink {
    href: String,
}

pub struct HttpPortalApi {
    client: Client,
    base_url: String,
    cookies: CookieJar,
}

impl HttpPortalApi {
    /// Create a client for the portal at `base_url`.
    ///
    /// `timeout` is the transport timeout; `None` leaves requests unbounded.
    pub fn new(base_url: &str, cookies: CookieJar, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        // Validate once so request building only fails on bad paths.
        build_url(base_url, &routes::jobs(), &QueryParams::new())?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            cookies,
        })
    }

    pub fn from_config(config: &ApiConfig, cookies: CookieJar) -> Result<Self, ApiError> {
        let timeout = match config.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self::new(&config.base_url, cookies, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &Route, query: &QueryParams) -> Result<Url, ApiError> {
        build_url(&self.base_url, route, query)
    }

    /// Keep cookies the backend sets, so a rotated CSRF token is sent back
    /// on the next call.
    fn absorb_cookies(&self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            match value.to_str() {
                Ok(set_cookie) => self.cookies.apply_set_cookie(set_cookie),
                Err(_) => debug!("Ignoring non-text Set-Cookie header"),
            }
        }
    }

    /// Start a request with the session cookies attached.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.cookies.header_value() {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    /// Start an unsafe request: JSON body plus the CSRF header.
    ///
    /// A missing token is sent as an empty header; the backend decides
    /// whether to reject the request.
    fn unsafe_request(&self, method: Method, url: Url, body: &Value, csrf_token: Option<&str>) -> RequestBuilder {
        self.request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, csrf_token.unwrap_or_default())
            .json(body)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        self.absorb_cookies(response.headers());
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    async fn datafiles_put(
        &self,
        operation: &str,
        target: &FileTarget,
        body: Value,
        csrf_token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.url(&routes::datafiles(operation, target), &QueryParams::new())?;
        let response = self.unsafe_request(Method::PUT, url, &body, csrf_token).send().await?;
        let envelope: DataEnvelope<Value> = self.decode(response).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn list_jobs(&self, params: &QueryParams) -> Result<Vec<JobEntry>, ApiError> {
        let url = self.url(&routes::jobs(), params)?;
        let response = self.request(Method::GET, url).send().await?;
        let envelope: ResponseEnvelope<Vec<JobEntry>> = self.decode(response).await?;
        Ok(envelope.response)
    }

    async fn submit_job(&self, job: &Value, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        let url = self.url(&routes::jobs(), &QueryParams::new())?;
        let response = self.unsafe_request(Method::POST, url, job, csrf_token).send().await?;
        let envelope: ResponseEnvelope<Value> = self.decode(response).await?;
        Ok(envelope.response)
    }

    async fn list_files(&self, params: &FileListingParams) -> Result<FileListing, ApiError> {
        let target = FileTarget {
            api: params.api.clone(),
            scheme: params.scheme.clone(),
            system: params.system.clone(),
            path: params.path.clone(),
        };
        let query = QueryParams::new().with("offset", params.offset).with("limit", params.limit);
        let url = self.url(&routes::datafiles("listing", &target), &query)?;
        let response = self.request(Method::GET, url).send().await?;
        let envelope: DataEnvelope<FileListing> = self.decode(response).await?;
        Ok(envelope.data)
    }

    async fn rename_file(
        &self,
        target: &FileTarget,
        new_name: &str,
        csrf_token: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.datafiles_put("rename", target, json!({ "new_name": new_name }), csrf_token)
            .await
    }

    async fn move_file(
        &self,
        target: &FileTarget,
        dest: &Destination,
        csrf_token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let body = json!({ "dest_system": dest.system, "dest_path": dest.path });
        self.datafiles_put("move", target, body, csrf_token).await
    }

    async fn copy_file(
        &self,
        target: &FileTarget,
        dest: &Destination,
        csrf_token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let body = json!({ "dest_system": dest.system, "dest_path": dest.path });
        self.datafiles_put("copy", target, body, csrf_token).await
    }

    async fn trash_file(&self, target: &FileTarget, csrf_token: Option<&str>) -> Result<Value, ApiError> {
        self.datafiles_put("trash", target, json!({}), csrf_token).await
    }

    async fn download_link(&self, target: &FileTarget, csrf_token: Option<&str>) -> Result<String, ApiError> {
        let data = self.datafiles_put("download", target, json!({}), csrf_token).await?;
        let link: DownloadLink = serde_json::from_value(data)?;
        Ok(link.href)
    }

    async fn fetch_allocations(&self) -> Result<Allocations, ApiError> {
        let url = self.url(&routes::allocations(), &QueryParams::new())?;
        let response = self.request(Method::GET, url).send().await?;
        let envelope: ResponseEnvelope<Allocations> = self.decode(response).await?;
        Ok(envelope.response)
    }

    async fn list_systems(&self) -> Result<Vec<SystemListEntry>, ApiError> {
        let url = self.url(&routes::systems_list(), &QueryParams::new())?;
        let response = self.request(Method::GET, url).send().await?;
        let envelope: ResponseEnvelope<Vec<SystemListEntry>> = self.decode(response).await?;
        Ok(envelope.response)
    }

    async fn push_keys(
        &self,
        system_id: &str,
        form: &PushKeysForm,
        csrf_token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.url(&routes::system_keys(system_id), &QueryParams::new())?;
        let body = json!({ "action": "push", "form": form });
        let response = self.unsafe_request(Method::PUT, url, &body, csrf_token).send().await?;
        let envelope: ResponseEnvelope<Value> = self.decode(response).await?;
        Ok(envelope.response)
    }
}
