//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, request-id injection, and
//! authentication-header inspection.
//!
//! A middleware receives the request and `next`, the [`Action`] it wraps.
//! Calling `next` continues the chain; not calling it short-circuits (an
//! auth check answering 401, for instance).
//!
//! ```rust
//! use switchyard::middleware::{self, BoxedMiddleware};
//! use switchyard::{Request, Response, StatusCode};
//!
//! let require_token: BoxedMiddleware = middleware::from_fn(|req: Request, next| async move {
//!     if req.header("authorization").is_none() {
//!         return Ok(Response::status(StatusCode::UNAUTHORIZED));
//!     }
//!     next.call(req).await
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::{Action, BoxFuture, ErasedHandler, Responder};
use crate::request::Request;
use crate::response::Response;

mod trace;

pub use trace::trace;

/// Wraps an [`Action`], running code before and after it.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Action) -> BoxFuture<'static, Result<Response, Error>>;
}

/// Middleware as it is stored and shared between routes.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Adapts an async closure `(Request, Action) -> Result<Response, Error>`
/// into a middleware.
pub fn from_fn<F, Fut>(f: F) -> BoxedMiddleware
where
    F: Fn(Request, Action) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    Arc::new(FromFn(f))
}

struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Action) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn handle(&self, req: Request, next: Action) -> BoxFuture<'static, Result<Response, Error>> {
        Box::pin((self.0)(req, next))
    }
}

/// Composes `middleware` around `responder` into a single [`Action`].
///
/// `middleware[0]` is outermost: it sees the request first and the response
/// last. An empty list returns the responder's own action unchanged.
///
/// The chain is built once here; each call of the resulting action walks it
/// top to bottom and back exactly once. Nothing in the chain catches errors
/// on the caller's behalf.
pub fn chain(middleware: &[BoxedMiddleware], responder: impl Responder) -> Action {
    middleware
        .iter()
        .rev()
        .fold(responder.into_action(), |next, mw| {
            Action::from_erased(Layer { middleware: Arc::clone(mw), next })
        })
}

/// One link of a chain: a middleware plus everything inside it.
struct Layer {
    middleware: BoxedMiddleware,
    next: Action,
}

impl ErasedHandler for Layer {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>> {
        self.middleware.handle(req, self.next.clone())
    }
}
