//! Per-request routing context — the hidden side-channel gates write to.
//!
//! Every [`Request`](crate::Request) owns one [`RouteContext`]. It lives in a
//! private field, so application code can read it through the request's
//! accessors but can never overwrite it. Each value is computed at most once
//! per request and reused by every later gate in the chain:
//!
//! - the parsed URL (resolved against `http://localhost`),
//! - the remaining, not yet consumed path (mount support),
//! - the normalized method,
//! - the parameters decoded by the most recent path match.

use std::collections::HashMap;
use std::sync::LazyLock;

use url::Url;

use crate::http::Method;

// Only the path component of the resolved URL is ever used.
static BASE_URL: LazyLock<Result<Url, url::ParseError>> =
    LazyLock::new(|| Url::parse("http://localhost"));

/// Decoded path parameters from the most recent path match.
///
/// # Examples
///
/// ```
/// use fetch_router::context::Params;
///
/// let params: Params = [("id", "café")].into_iter().collect();
/// assert_eq!(params.get("id"), Some("café"));
/// assert_eq!(params.get("missing"), None);
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Params {
    map: HashMap<String, String>,
}

impl Params {
    /// Create a new empty parameters map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a decoded value, replacing any previous value for `key`
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Get a decoded value by parameter name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The mount-relative part of a [`RouteContext`].
///
/// Captured by [`Stack`](crate::middleware::Stack) before a layer runs and
/// restored before the following sibling runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct MountPoint {
    path: Option<String>,
    params: Params,
}

/// Lazily computed routing state attached to one request.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    url: Option<Url>,
    path: Option<String>,
    method: Option<Method>,
    params: Params,
}

impl RouteContext {
    /// The parsed request URL, if a path gate has resolved it yet.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The portion of the path not consumed by enclosing path gates.
    pub fn remaining_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The uppercased method, if a method gate has resolved it yet.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the path the next path gate should test.
    ///
    /// Resolves and caches the URL on first use. A remaining path left by an
    /// enclosing gate always wins over the URL's pathname, even when empty.
    pub(crate) fn current_path(&mut self, raw_url: &str) -> Result<String, url::ParseError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let url = match self.url.take() {
            Some(url) => url,
            None => {
                let base = BASE_URL.as_ref().map_err(|err| *err)?;
                Url::options().base_url(Some(base)).parse(raw_url)?
            }
        };
        let path = url.path().to_owned();
        self.url = Some(url);
        Ok(path)
    }

    /// Records a successful path match. Must run before the wrapped handler.
    pub(crate) fn consume(&mut self, remaining: String, params: Params) {
        self.path = Some(remaining);
        self.params = params;
    }

    /// Returns the cached normalized method, computing it from `raw` once.
    pub(crate) fn resolve_method(&mut self, raw: &str) -> &Method {
        self.method.get_or_insert_with(|| Method::normalize(raw))
    }

    pub(crate) fn mount_point(&self) -> MountPoint {
        MountPoint {
            path: self.path.clone(),
            params: self.params.clone(),
        }
    }

    pub(crate) fn restore(&mut self, point: MountPoint) {
        self.path = point.path;
        self.params = point.params;
    }
}
