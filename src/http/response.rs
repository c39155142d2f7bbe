//! Responses produced by terminal handlers.

use bytes::Bytes;

use super::StatusCode;

/// A status code plus an optional body.
///
/// # Examples
///
/// ```
/// use fetch_router::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::Ok).body("hello world");
/// assert_eq!(response.status(), StatusCode::Ok);
/// assert_eq!(response.text(), Some("hello world"));
///
/// assert_eq!(Response::not_found().status().as_u16(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }

    /// The response returned when no route in a chain matched.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    /// Sets the response body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text, or `None` if it is not valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}
