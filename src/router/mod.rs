//! Request routing — path gates, method gates and per-verb shorthands.
//!
//! Routers are plain middleware trees. A path gate tests the unconsumed part
//! of the path, a method gate tests the verb, and the shorthands compose the
//! two with the path outermost:
//!
//! ```text
//! get(p, h)  ==  path(p, method("GET", h))
//! ```
//!
//! so a path mismatch short-circuits before any method check. Mounting is
//! just nesting with `end(false)`:
//!
//! ```
//! use fetch_router::{Request, Response, StatusCode};
//! use fetch_router::middleware::{dispatch, handler};
//! use fetch_router::pattern::PatternOptions;
//! use fetch_router::router::{get, path_with};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = path_with(
//!     "/here",
//!     get("/there", handler(|_req| async { Ok(Response::new(StatusCode::Ok)) })).unwrap(),
//!     PatternOptions::default().end(false),
//! )
//! .unwrap();
//!
//! let hit = dispatch(&app, Request::new("GET", "/here/there")).await.unwrap();
//! assert_eq!(hit.status(), StatusCode::Ok);
//!
//! let miss = dispatch(&app, Request::new("GET", "/there/here")).await.unwrap();
//! assert_eq!(miss.status(), StatusCode::NotFound);
//! # }
//! ```

use crate::http::Method;
use crate::middleware::Middleware;
use crate::pattern::{PathSpec, PatternError, PatternOptions};

mod method;
mod path;

pub use method::MethodGate;
pub use path::PathGate;

/// A path gate wrapping a method gate, as built by the verb shorthands.
pub type Route<H> = PathGate<MethodGate<H>>;

/// Gate `handler` on `spec` with default options.
///
/// # Errors
///
/// Returns [`PatternError`] if `spec` does not compile.
pub fn path<H: Middleware>(spec: impl Into<PathSpec>, handler: H) -> Result<PathGate<H>, PatternError> {
    PathGate::new(spec, handler)
}

/// Gate `handler` on `spec` with explicit options, e.g. `end(false)` to mount.
///
/// # Errors
///
/// Returns [`PatternError`] if `spec` does not compile.
pub fn path_with<H: Middleware>(
    spec: impl Into<PathSpec>,
    handler: H,
    options: PatternOptions,
) -> Result<PathGate<H>, PatternError> {
    PathGate::with_options(spec, handler, options)
}

/// Gate `handler` on the request method.
pub fn method<H: Middleware>(verb: impl Into<Method>, handler: H) -> MethodGate<H> {
    MethodGate::new(verb, handler)
}

/// Gate `handler` on `spec` first, then on `verb`.
///
/// # Errors
///
/// Returns [`PatternError`] if `spec` does not compile.
pub fn route<H: Middleware>(
    verb: impl Into<Method>,
    spec: impl Into<PathSpec>,
    handler: H,
    options: PatternOptions,
) -> Result<Route<H>, PatternError> {
    PathGate::with_options(spec, MethodGate::new(verb, handler), options)
}

macro_rules! verb {
    ($name:ident, $name_with:ident, $method:ident, $verb:literal) => {
        #[doc = concat!("Route `", $verb, "` requests matching `spec` to `handler`.")]
        ///
        /// # Errors
        ///
        /// Returns [`PatternError`] if `spec` does not compile.
        pub fn $name<H: Middleware>(
            spec: impl Into<PathSpec>,
            handler: H,
        ) -> Result<Route<H>, PatternError> {
            route(Method::$method, spec, handler, PatternOptions::default())
        }

        #[doc = concat!("Like [`", stringify!($name), "`], with explicit pattern options.")]
        ///
        /// # Errors
        ///
        /// Returns [`PatternError`] if `spec` does not compile.
        pub fn $name_with<H: Middleware>(
            spec: impl Into<PathSpec>,
            handler: H,
            options: PatternOptions,
        ) -> Result<Route<H>, PatternError> {
            route(Method::$method, spec, handler, options)
        }
    };
}

verb!(get, get_with, Get, "GET");
verb!(head, head_with, Head, "HEAD");
verb!(put, put_with, Put, "PUT");
verb!(post, post_with, Post, "POST");
verb!(patch, patch_with, Patch, "PATCH");
verb!(delete, delete_with, Delete, "DELETE");
verb!(options, options_with, Options, "OPTIONS");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Next, dispatch, handler};
    use crate::{Request, Response, StatusCode};

    fn ok() -> impl Middleware {
        handler(|_req| async { Ok(Response::new(StatusCode::Ok)) })
    }

    async fn status<M: Middleware>(app: &M, method: &str, url: &str) -> StatusCode {
        dispatch(app, Request::new(method, url)).await.unwrap().status()
    }

    #[tokio::test]
    async fn get_matches_path_and_method() {
        let app = get("/test", ok()).unwrap();
        assert_eq!(status(&app, "get", "/test").await, StatusCode::Ok);
        assert_eq!(status(&app, "GET", "/").await, StatusCode::NotFound);
        assert_eq!(status(&app, "delete", "/test").await, StatusCode::NotFound);
    }

    #[tokio::test]
    async fn every_shorthand_gates_its_verb() {
        let cases = [
            ("GET", get("/r", ok()).unwrap()),
            ("HEAD", head("/r", ok()).unwrap()),
            ("PUT", put("/r", ok()).unwrap()),
            ("POST", post("/r", ok()).unwrap()),
            ("PATCH", patch("/r", ok()).unwrap()),
            ("DELETE", delete("/r", ok()).unwrap()),
            ("OPTIONS", options("/r", ok()).unwrap()),
        ];
        for (verb, app) in &cases {
            assert_eq!(status(app, verb, "/r").await, StatusCode::Ok, "{verb}");
            let other = if *verb == "GET" { "POST" } else { "GET" };
            assert_eq!(status(app, other, "/r").await, StatusCode::NotFound, "{verb}");
        }
    }

    #[tokio::test]
    async fn path_is_checked_before_method() {
        // Both gates fail; only the path gate may have touched the request.
        let app = get(
            "/test",
            handler(|_req| async { Ok(Response::new(StatusCode::Ok)) }),
        )
        .unwrap();
        let observe = Next::new(|req: Request| async move {
            assert!(req.normalized_method().is_none());
            assert!(req.parsed_url().is_some());
            Ok(Response::not_found())
        });
        let res = app.handle(Request::new("DELETE", "/other"), observe).await.unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn shorthand_with_options() {
        let app = get_with("/Docs", ok(), PatternOptions::default().sensitive(true)).unwrap();
        assert_eq!(status(&app, "GET", "/Docs").await, StatusCode::Ok);
        assert_eq!(status(&app, "GET", "/docs").await, StatusCode::NotFound);
    }

    #[tokio::test]
    async fn route_accepts_any_verb() {
        let app = route("purge", "/cache", ok(), PatternOptions::default()).unwrap();
        assert_eq!(status(&app, "PURGE", "/cache").await, StatusCode::Ok);
    }

    #[test]
    fn invalid_pattern_is_rejected_by_shorthand() {
        assert!(matches!(
            post("/:id(", ok()),
            Err(PatternError::UnbalancedPattern { index: 4 })
        ));
    }
}
