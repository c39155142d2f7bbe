//! Transport-level request and response types consumed by the router.
//!
//! The router never performs I/O. These types carry just enough of an HTTP
//! exchange for matching: a raw method, a raw URL, a body, and a status.

use std::fmt;

pub mod request;
pub mod response;

pub use request::Request;
pub use response::Response;

/// An HTTP response status code.
///
/// # Examples
///
/// ```
/// use fetch_router::http::StatusCode;
///
/// let status = StatusCode::NotFound;
/// assert_eq!(status.as_u16(), 404);
/// assert_eq!(status.canonical_reason(), "Not Found");
/// assert!(!status.is_success());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    // 2xx Success
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,

    // 4xx Client Error
    NotFound = 404,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for 2xx codes.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::Accepted => "Accepted",
            Self::NoContent => "No Content",
            Self::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

/// An HTTP request method in its normalized (uppercase) form.
///
/// Raw method strings arrive in any case (`"post"`, `"Post"`), so the router
/// compares methods only after [`Method::normalize`]. Non-standard verbs are
/// kept in [`Method::Custom`], already uppercased.
///
/// # Examples
///
/// ```
/// use fetch_router::http::Method;
///
/// assert_eq!(Method::normalize("post"), Method::Post);
/// assert_eq!(Method::normalize("purge"), Method::Custom("PURGE".into()));
/// assert_eq!(Method::Delete.as_str(), "DELETE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Put,
    Post,
    Patch,
    Delete,
    Options,
    Connect,
    Trace,
    /// Any other verb, stored uppercase.
    Custom(String),
}

impl Method {
    /// Uppercases `raw` and maps it onto a [`Method`].
    pub fn normalize(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            _ => Self::Custom(raw.to_uppercase()),
        }
    }

    /// Returns the method as an uppercase string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(Method::normalize("get"), Method::Get);
        assert_eq!(Method::normalize("GeT"), Method::Get);
        assert_eq!(Method::normalize("options"), Method::Options);
    }

    #[test]
    fn normalize_keeps_custom_verbs_uppercase() {
        assert_eq!(Method::normalize("test"), Method::Custom("TEST".to_owned()));
        assert_eq!(Method::normalize("test").as_str(), "TEST");
    }

    #[test]
    fn status_code_display() {
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
        assert_eq!(u16::from(StatusCode::Ok), 200);
        assert!(StatusCode::NoContent.is_success());
    }

    #[test]
    fn routing_status_codes() {
        let codes = [
            StatusCode::Ok,
            StatusCode::Created,
            StatusCode::Accepted,
            StatusCode::NoContent,
            StatusCode::NotFound,
        ];
        let numbers: Vec<u16> = codes.iter().map(|c| c.as_u16()).collect();
        assert_eq!(numbers, [200, 201, 202, 204, 404]);
        assert_eq!(codes.iter().filter(|c| c.is_success()).count(), 4);
    }
}
