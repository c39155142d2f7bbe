//! # fetch-router
//!
//! Composable middleware for routing HTTP-like requests by path pattern and
//! method. Every piece shares one calling convention, `(request, next) ->
//! response`, so gates nest freely and whole routers mount under prefixes.
//!
//! ## Quick Start
//!
//! ```rust
//! use fetch_router::{Request, Response, StatusCode};
//! use fetch_router::middleware::{dispatch, handler};
//! use fetch_router::router::get;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let app = get("/users/:id", handler(|req: Request| async move {
//!     let id = req.params().get("id").unwrap_or_default().to_owned();
//!     Ok(Response::new(StatusCode::Ok).body(id))
//! }))?;
//!
//! let res = dispatch(&app, Request::new("GET", "/users/caf%C3%A9")).await?;
//! assert_eq!(res.text(), Some("café"));
//!
//! let res = dispatch(&app, Request::new("GET", "/posts/1")).await?;
//! assert_eq!(res.status(), StatusCode::NotFound);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod http;
pub mod middleware;
pub mod pattern;
pub mod router;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use context::Params;
pub use http::{Method, Request, Response, StatusCode};
pub use middleware::{Error, Middleware, Next, RouteResult, dispatch, handler};
pub use pattern::{PatternError, PatternOptions};
