//! The request value threaded through a middleware chain.

use bytes::Bytes;
use url::Url;

use crate::context::{Params, RouteContext};

use super::Method;

/// An HTTP-like request: a raw method, a raw URL, and a body.
///
/// The raw strings are never rewritten. Routing state derived from them lives
/// in a private [`RouteContext`] that only the gates in this crate can write;
/// handlers read it through [`params`](Self::params),
/// [`remaining_path`](Self::remaining_path) and friends.
///
/// # Examples
///
/// ```
/// use fetch_router::Request;
///
/// let request = Request::new("get", "/caf%C3%A9?lang=fr");
/// assert_eq!(request.method(), "get");
/// assert_eq!(request.url(), "/caf%C3%A9?lang=fr");
/// assert!(request.params().is_empty());
/// assert_eq!(request.remaining_path(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    url: String,
    body: Bytes,
    route: RouteContext,
}

impl Request {
    /// Creates a request with an empty body.
    ///
    /// `url` may be absolute (`https://host/path`) or a bare path; bare paths
    /// are resolved against `http://localhost` when a gate first needs them.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body: Bytes::new(),
            route: RouteContext::default(),
        }
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the method exactly as supplied.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the URL exactly as supplied, still percent-encoded.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parameters decoded by the innermost path gate that matched.
    pub fn params(&self) -> &Params {
        self.route.params()
    }

    /// The path not yet consumed by enclosing path gates, once one has matched.
    pub fn remaining_path(&self) -> Option<&str> {
        self.route.remaining_path()
    }

    /// The cached parsed URL, once a path gate has resolved it.
    pub fn parsed_url(&self) -> Option<&Url> {
        self.route.url()
    }

    /// The cached uppercase method, once a method gate has resolved it.
    pub fn normalized_method(&self) -> Option<&Method> {
        self.route.method()
    }

    pub fn route_context(&self) -> &RouteContext {
        &self.route
    }

    pub(crate) fn route_context_mut(&mut self) -> &mut RouteContext {
        &mut self.route
    }

    // Raw method and mutable state are borrowed together so gates can resolve
    // caches without cloning the raw strings.
    pub(crate) fn route_parts(&mut self) -> (&str, &str, &mut RouteContext) {
        (&self.method, &self.url, &mut self.route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_fields_are_preserved() {
        let req = Request::new("PoSt", "/a%20b").with_body("payload");
        assert_eq!(req.method(), "PoSt");
        assert_eq!(req.url(), "/a%20b");
        assert_eq!(req.body().as_ref(), b"payload");
    }

    #[test]
    fn derived_state_starts_empty() {
        let req = Request::new("GET", "/");
        assert!(req.parsed_url().is_none());
        assert!(req.normalized_method().is_none());
        assert!(req.remaining_path().is_none());
        assert!(req.params().is_empty());
    }

    #[test]
    fn route_parts_share_state() {
        let mut req = Request::new("delete", "/x/y");
        {
            let (method, url, route) = req.route_parts();
            route.resolve_method(method);
            route.current_path(url).unwrap();
        }
        assert_eq!(req.normalized_method(), Some(&Method::Delete));
        assert_eq!(req.parsed_url().map(Url::path), Some("/x/y"));
    }
}
