//! Deadline for a whole middleware tree.

use std::time::Duration;

use super::{BoxFuture, Error, Middleware, Next, RouteResult};
use crate::Request;

/// Races the wrapped middleware against a timer.
///
/// When the timer wins the chain's future is dropped and
/// [`Error::Timeout`] is returned. The chain has no interruption hook of its
/// own; work already handed to other tasks keeps running.
#[derive(Debug, Clone)]
pub struct Timeout<M> {
    inner: M,
    duration: Duration,
}

impl<M: Middleware> Timeout<M> {
    pub fn new(inner: M, duration: Duration) -> Self {
        Self { inner, duration }
    }
}

impl<M: Middleware> Middleware for Timeout<M> {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<RouteResult> {
        let duration = self.duration;
        let fut = self.inner.handle(req, next);
        Box::pin(async move {
            tokio::time::timeout(duration, fut)
                .await
                .map_err(|_| Error::Timeout(duration))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{dispatch, handler};
    use crate::{Response, StatusCode};

    #[tokio::test(start_paused = true)]
    async fn slow_handler_times_out() {
        let slow = handler(|_req| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Response::new(StatusCode::Ok))
        });
        let app = Timeout::new(slow, Duration::from_secs(1));
        let err = dispatch(&app, Request::new("GET", "/")).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn fast_handler_finishes() {
        let fast = handler(|_req| async { Ok(Response::new(StatusCode::Ok)) });
        let app = Timeout::new(fast, Duration::from_secs(1));
        let res = dispatch(&app, Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
    }
}
