//! Path gate — runs a handler only when the unconsumed path matches.

use std::future;

use tracing::trace;

use crate::middleware::{BoxFuture, Error, Middleware, Next, RouteResult};
use crate::pattern::{Matcher, PathSpec, PatternError, PatternOptions};
use crate::Request;

/// Middleware that matches a pattern against the request's remaining path.
///
/// On a match the gate cuts the matched range out of the path, records the
/// remainder and the decoded params on the request, then calls the wrapped
/// handler with the same `next`. A nested gate therefore sees only what
/// enclosing gates left over, which is how routers are mounted under a
/// prefix. On a mismatch the request goes to `next` untouched.
///
/// Patterns compile when the gate is built, never per request.
pub struct PathGate<H> {
    matcher: Matcher,
    handler: H,
}

impl<H: Middleware> PathGate<H> {
    /// Builds a gate with [`PatternOptions::default`].
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `spec` does not compile.
    pub fn new(spec: impl Into<PathSpec>, handler: H) -> Result<Self, PatternError> {
        Self::with_options(spec, handler, PatternOptions::default())
    }

    /// Builds a gate with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `spec` does not compile.
    pub fn with_options(
        spec: impl Into<PathSpec>,
        handler: H,
        options: PatternOptions,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: Matcher::compile(spec, &options)?,
            handler,
        })
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    // Tests the request and, on a match, records the new mount state.
    fn admit(&self, req: &mut Request) -> Result<bool, Error> {
        let (_, url, route) = req.route_parts();
        let path = route.current_path(url)?;

        let Some(m) = self.matcher.matches(&path)? else {
            trace!(pattern = self.matcher.source(), %path, "path mismatch");
            return Ok(false);
        };

        let remaining = m.remainder(&path);
        trace!(pattern = self.matcher.source(), %path, %remaining, "path matched");
        route.consume(remaining, m.params);
        Ok(true)
    }
}

impl<H: Middleware> Middleware for PathGate<H> {
    fn handle(&self, mut req: Request, next: Next) -> BoxFuture<RouteResult> {
        match self.admit(&mut req) {
            Ok(true) => self.handler.handle(req, next),
            Ok(false) => Box::pin(next.run(req)),
            Err(err) => Box::pin(future::ready(Err(err))),
        }
    }
}
