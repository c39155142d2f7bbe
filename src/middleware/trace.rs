//! Request logging around a middleware tree.

use tokio::time::Instant;
use tracing::{info, warn};

use super::{BoxFuture, Middleware, Next, RouteResult};
use crate::Request;

/// Logs each request's method, URL, outcome and duration.
///
/// Emits one `tracing::info!` record after the wrapped middleware answers, or
/// a `tracing::warn!` record when it fails. The result is returned unchanged,
/// errors included.
///
/// # Examples
///
/// ```
/// use fetch_router::{Request, Response, StatusCode};
/// use fetch_router::middleware::{Trace, dispatch, handler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let app = Trace::new(handler(|_req| async { Ok(Response::new(StatusCode::Ok)) }));
/// let res = dispatch(&app, Request::new("GET", "/ping")).await.unwrap();
/// assert_eq!(res.status(), StatusCode::Ok);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Trace<M> {
    inner: M,
}

impl<M: Middleware> Trace<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M: Middleware> Middleware for Trace<M> {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<RouteResult> {
        let method = req.method().to_owned();
        let url = req.url().to_owned();
        let start = Instant::now();
        let fut = self.inner.handle(req, next);

        Box::pin(async move {
            let result = fut.await;
            let duration = start.elapsed();

            match &result {
                Ok(response) => info!(
                    %method,
                    %url,
                    status = response.status().as_u16(),
                    ?duration,
                    "request routed"
                ),
                Err(error) => warn!(%method, %url, %error, ?duration, "request failed"),
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Error, dispatch, handler};
    use crate::StatusCode;

    #[tokio::test]
    async fn passes_responses_through() {
        let app = Trace::new(|req: Request, next: Next| next.run(req));
        let res = dispatch(&app, Request::new("GET", "/missing")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn passes_errors_through() {
        let app = Trace::new(handler(|_req| async { Err(Error::handler("broken")) }));
        let err = dispatch(&app, Request::new("GET", "/")).await.unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
    }
}
