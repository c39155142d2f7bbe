//! Ordered sibling middleware.

use std::sync::Arc;

use tracing::debug;

use super::{BoxFuture, Middleware, MiddlewareHandler, Next, RouteResult};
use crate::Request;

/// Middleware tried in registration order until one answers.
///
/// Each layer's continuation is the following layer; the last layer's
/// continuation is the `next` the stack itself was called with.
///
/// A layer may partially match (an outer path gate consumes part of the path,
/// then an inner gate declines). Before the following sibling runs, the stack
/// rewinds the remaining path and params to what they were when that layer
/// was entered, so every sibling tests the same path. The cached URL and
/// normalized method are kept.
///
/// # Examples
///
/// ```
/// use fetch_router::{Request, Response, StatusCode};
/// use fetch_router::middleware::{Stack, dispatch, handler};
/// use fetch_router::router::{get, post};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let app = Stack::new()
///     .push(get("/items", handler(|_req| async { Ok(Response::new(StatusCode::Ok)) })).unwrap())
///     .push(post("/items", handler(|_req| async { Ok(Response::new(StatusCode::Created)) })).unwrap());
///
/// let res = dispatch(&app, Request::new("POST", "/items")).await.unwrap();
/// assert_eq!(res.status(), StatusCode::Created);
/// # }
/// ```
#[derive(Clone)]
pub struct Stack {
    layers: Arc<[MiddlewareHandler]>,
}

impl Default for Stack {
    fn default() -> Self {
        Self {
            layers: Arc::from(Vec::new()),
        }
    }
}

impl Stack {
    /// Create an empty stack; it passes every request to `next`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer.
    #[must_use]
    pub fn push(self, layer: impl Middleware) -> Self {
        self.push_handler(Arc::new(layer))
    }

    /// Appends an already type-erased layer.
    #[must_use]
    pub fn push_handler(self, layer: MiddlewareHandler) -> Self {
        let mut layers = self.layers.to_vec();
        layers.push(layer);
        Self {
            layers: layers.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Middleware for Stack {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<RouteResult> {
        run_layer(Arc::clone(&self.layers), 0, req, next)
    }
}

fn run_layer(
    layers: Arc<[MiddlewareHandler]>,
    index: usize,
    req: Request,
    next: Next,
) -> BoxFuture<RouteResult> {
    let Some(layer) = layers.get(index).cloned() else {
        return Box::pin(next.run(req));
    };

    let point = req.route_context().mount_point();
    let rest = Next::new(move |mut req: Request| {
        debug!(layer = index, "layer declined, trying next sibling");
        req.route_context_mut().restore(point.clone());
        run_layer(Arc::clone(&layers), index + 1, req, next.clone())
    });

    layer.handle(req, rest)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::middleware::{dispatch, handler};
    use crate::{Response, StatusCode};

    fn status(code: StatusCode) -> impl Middleware {
        handler(move |_req| async move { Ok(Response::new(code)) })
    }

    #[tokio::test]
    async fn empty_stack_falls_through() {
        let res = dispatch(&Stack::new(), Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn first_answering_layer_wins() {
        let app = Stack::new()
            .push(status(StatusCode::Ok))
            .push(status(StatusCode::Accepted));
        assert_eq!(app.len(), 2);
        let res = dispatch(&app, Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn layers_run_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = |tag: &'static str| {
            let seen = Arc::clone(&seen);
            move |req: Request, next: Next| {
                seen.lock().unwrap().push(tag);
                next.run(req)
            }
        };

        let app = Stack::new().push(record("a")).push(record("b")).push(record("c"));
        let res = dispatch(&app, Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn nested_stacks_continue_outward() {
        let inner = Stack::new().push(|req: Request, next: Next| next.run(req));
        let app = Stack::new().push(inner).push(status(StatusCode::NoContent));
        let res = dispatch(&app, Request::new("GET", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NoContent);
    }
}
