//! Middleware chain protocol — the `(request, next) -> response` calling
//! convention every gate, handler and stack in this crate implements.
//!
//! ## Core types
//!
//! - [`Middleware`] — trait implemented by all middleware, and by any
//!   `Fn(Request, Next) -> impl Future<Output = RouteResult>` closure.
//! - [`Next`] — the continuation: "whatever runs if I don't answer".
//! - [`handler`] — adapts a terminal `Fn(Request)` that never calls `next`.
//! - [`Stack`] — sibling middleware tried in order.
//! - [`dispatch`] — runs a tree with the canonical 404 continuation.
//! - [`Trace`] / [`Timeout`] — wrappers for logging and external deadlines.
//!
//! Requests move by value. A middleware that declines passes the request on
//! with `next.run(req)`; a middleware that answers returns a response and
//! drops `next`. Errors are never turned into responses here; they surface to
//! the caller of [`dispatch`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::pattern::DecodeError;
use crate::{Request, Response};

mod stack;
mod timeout;
mod trace;

pub use stack::Stack;
pub use timeout::Timeout;
pub use trace::Trace;

/// A boxed error raised by application handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A heap-allocated, `Send` future, as returned by [`Middleware::handle`].
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The outcome of running a middleware chain.
pub type RouteResult = Result<Response, Error>;

/// A type-erased, reference-counted middleware.
pub type MiddlewareHandler = Arc<dyn Middleware>;

/// Errors that escape a middleware chain.
///
/// "No route matched" is not an error; it is the terminal continuation's
/// response.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode path parameter: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("route did not respond within {0:?}")]
    Timeout(Duration),

    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl Error {
    /// Wraps an application error raised inside a handler.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }
}

/// The core trait for all middleware.
///
/// Implementors receive the request and the continuation. They may:
///
/// - **Decline** — `next.run(req).await`, returning its result unmodified.
/// - **Answer** — return a [`Response`] without touching `next`.
/// - **Delegate** — hand both to a wrapped middleware, as the gates do.
///
/// # Contract
///
/// - Middleware is shared across tasks, so it must be `Send + Sync`.
/// - No per-request state may live in the middleware itself; it belongs on
///   the [`Request`].
pub trait Middleware: Send + Sync + 'static {
    /// Handle `req`, or pass it to `next`.
    fn handle(&self, req: Request, next: Next) -> BoxFuture<RouteResult>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouteResult> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture<RouteResult> {
        Box::pin((self)(req, next))
    }
}

/// Converts a [`Middleware`] into a shareable [`MiddlewareHandler`].
pub fn from_middleware<M: Middleware>(middleware: M) -> MiddlewareHandler {
    Arc::new(middleware)
}

/// The continuation handed to every middleware.
///
/// Cloning is cheap; all clones run the same pipeline.
///
/// # Examples
///
/// ```
/// use fetch_router::{Request, StatusCode};
/// use fetch_router::middleware::Next;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let res = Next::not_found().run(Request::new("GET", "/")).await.unwrap();
/// assert_eq!(res.status(), StatusCode::NotFound);
/// # }
/// ```
#[derive(Clone)]
pub struct Next {
    inner: Arc<dyn Fn(Request) -> BoxFuture<RouteResult> + Send + Sync>,
}

impl Next {
    /// Builds a continuation from a closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RouteResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |req| Box::pin(f(req))),
        }
    }

    /// The terminal continuation: always answers `404 Not Found`.
    pub fn not_found() -> Self {
        Self::new(|_req| async { Ok(Response::not_found()) })
    }

    /// Runs the rest of the pipeline with `req`.
    pub async fn run(self, req: Request) -> RouteResult {
        (self.inner)(req).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A terminal handler produced by [`handler`].
#[derive(Clone)]
pub struct Handler<F> {
    f: F,
}

/// Adapts `Fn(Request) -> impl Future<Output = RouteResult>` into a
/// [`Middleware`] that always answers and never calls `next`.
///
/// # Examples
///
/// ```
/// use fetch_router::{Request, Response, StatusCode};
/// use fetch_router::middleware::{dispatch, handler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let hello = handler(|_req: Request| async { Ok(Response::new(StatusCode::Ok).body("hello")) });
/// let res = dispatch(&hello, Request::new("GET", "/anything")).await.unwrap();
/// assert_eq!(res.text(), Some("hello"));
/// # }
/// ```
pub fn handler<F, Fut>(f: F) -> Handler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouteResult> + Send + 'static,
{
    Handler { f }
}

impl<F, Fut> Middleware for Handler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouteResult> + Send + 'static,
{
    fn handle(&self, req: Request, _next: Next) -> BoxFuture<RouteResult> {
        Box::pin((self.f)(req))
    }
}

/// Runs `app` with [`Next::not_found`] as the base continuation.
///
/// # Errors
///
/// Returns whatever [`Error`] escapes the chain: a parameter decode failure,
/// an unparsable URL, a timeout, or a handler error.
pub async fn dispatch<M>(app: &M, req: Request) -> RouteResult
where
    M: Middleware + ?Sized,
{
    app.handle(req, Next::not_found()).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::StatusCode;

    fn ok(body: &'static str) -> Handler<impl Fn(Request) -> BoxFuture<RouteResult> + Send + Sync> {
        handler(move |_req| -> BoxFuture<RouteResult> {
            Box::pin(async move { Ok(Response::new(StatusCode::Ok).body(body)) })
        })
    }

    #[tokio::test]
    async fn dispatch_with_terminal_handler() {
        let res = dispatch(&ok("hi"), Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.text(), Some("hi"));
    }

    #[tokio::test]
    async fn closure_middleware_can_decline() {
        let pass = |req: Request, next: Next| async move { next.run(req).await };
        let res = dispatch(&pass, Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn handler_never_calls_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let next = Next::new(move |_req| {
            counted.fetch_add(1, Ordering::SeqCst);
            async { Ok(Response::not_found()) }
        });

        let res = ok("done").handle(Request::new("GET", "/"), next).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let failing = handler(|_req| async { Err(Error::handler("boom")) });
        let err = dispatch(&failing, Request::new("GET", "/")).await.unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.to_string(), "handler failed: boom");
    }

    #[tokio::test]
    async fn continuation_errors_propagate_through_declining_middleware() {
        let pass = |req: Request, next: Next| async move { next.run(req).await };
        let next = Next::new(|_req| async { Err(Error::Timeout(Duration::from_millis(5))) });
        let err = pass.handle(Request::new("GET", "/"), next).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(5)));
    }

    #[tokio::test]
    async fn from_middleware_erases_type() {
        let erased: MiddlewareHandler = from_middleware(ok("erased"));
        let res = dispatch(erased.as_ref(), Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.text(), Some("erased"));
    }
}
