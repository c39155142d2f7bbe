//! Method gate — runs a handler only for one HTTP verb.

use tracing::trace;

use crate::http::Method;
use crate::middleware::{BoxFuture, Middleware, Next, RouteResult};
use crate::Request;

/// Middleware that compares the request's normalized method with a verb.
///
/// Both sides are uppercased: the target once at construction, the request's
/// method once per request (cached for every later gate).
pub struct MethodGate<H> {
    verb: Method,
    handler: H,
}

impl<H: Middleware> MethodGate<H> {
    pub fn new(verb: impl Into<Method>, handler: H) -> Self {
        Self {
            verb: Method::normalize(verb.into().as_str()),
            handler,
        }
    }

    pub fn verb(&self) -> &Method {
        &self.verb
    }
}

impl<H: Middleware> Middleware for MethodGate<H> {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture<RouteResult> {
        let (raw, _, route) = req.route_parts();
        let method = route.resolve_method(raw);

        if *method == self.verb {
            trace!(%method, "method matched");
            self.handler.handle(req, next)
        } else {
            trace!(%method, expected = %self.verb, "method mismatch");
            Box::pin(next.run(req))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{dispatch, handler};
    use crate::{Response, StatusCode};

    fn ok() -> impl Middleware {
        handler(|_req| async { Ok(Response::new(StatusCode::Ok)) })
    }

    #[tokio::test]
    async fn matches_regardless_of_case() {
        let app = MethodGate::new("POST", ok());
        let res = dispatch(&app, Request::new("post", "/test")).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn target_verb_is_normalized() {
        let app = MethodGate::new("patch", ok());
        assert_eq!(app.verb(), &Method::Patch);
        let res = dispatch(&app, Request::new("PATCH", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn custom_verbs_compare_uppercase() {
        let app = MethodGate::new(Method::Custom("purge".into()), ok());
        let res = dispatch(&app, Request::new("Purge", "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn mismatch_calls_next() {
        let app = MethodGate::new("POST", ok());
        let res = dispatch(&app, Request::new("get", "/other")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn normalized_method_is_visible_to_handler() {
        let app = MethodGate::new(
            "DELETE",
            handler(|req: Request| async move {
                let seen = req.normalized_method().map(ToString::to_string).unwrap_or_default();
                Ok(Response::new(StatusCode::Ok).body(seen))
            }),
        );
        let res = dispatch(&app, Request::new("delete", "/")).await.unwrap();
        assert_eq!(res.text(), Some("DELETE"));
    }
}
