//! Client-side cookie storage.
//!
//! The portal session lives in cookies set by the backend: a session id that
//! authenticates requests and a `csrftoken` that must be echoed back in the
//! `X-CSRFToken` header of unsafe requests. The jar is shared between the
//! HTTP client, which sends every cookie and keeps the ones responses set,
//! and the sagas, which read the token.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    cookies: Arc<RwLock<BTreeMap<String, String>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` header value such as `csrftoken=abc; sessionid=xyz`.
    ///
    /// Malformed pairs are skipped; later duplicates win.
    pub fn parse(header: &str) -> Self {
        let jar = Self::new();
        for pair in header.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    jar.set(name, value.trim());
                }
            }
        }
        jar
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies.read().ok().and_then(|cookies| cookies.get(name).cloned())
    }

    pub fn set(&self, name: &str, value: &str) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.insert(name.to_string(), value.to_string());
        }
    }

    /// Apply one `Set-Cookie` header value. Attributes other than `Max-Age`
    /// are ignored; a non-positive `Max-Age` deletes the cookie.
    pub fn apply_set_cookie(&self, header: &str) {
        let mut parts = header.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let expired = parts.filter_map(|attr| attr.split_once('=')).any(|(key, value)| {
            key.trim().eq_ignore_ascii_case("max-age") && value.trim().parse::<i64>().is_ok_and(|age| age <= 0)
        });

        if expired {
            self.remove(name);
        } else {
            self.set(name, value.trim());
        }
    }

    pub fn remove(&self, name: &str) {
        if let Ok(mut cookies) = self.cookies.write() {
            cookies.remove(name);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.read().map(|cookies| cookies.is_empty()).unwrap_or(true)
    }

    /// Render the jar back into a `Cookie` header value.
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.cookies.read().ok()?;
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
