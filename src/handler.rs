//! Responders, actions, and type erasure.
//!
//! # How async responders are stored
//!
//! A [`Route`](crate::Route) holds responders of *different* types in one
//! `HashMap<Method, Action>`. Rust collections hold one concrete type, so
//! every responder is hidden behind a trait object and wrapped in an
//! [`Action`]:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", &[], hello)
//! hello.into_action()                              ← Responder blanket impl
//!        ↓
//! Action(Arc::new(FnHandler(hello)))               ← heap-allocated wrapper
//!        ↓  middleware::chain wraps it in layers, still an Action
//! action.call(req)  at request time                ← one vtable call per layer
//!        ↓
//! Box::pin(async { hello(req).await.into_result() })  ← BoxFuture
//! ```
//!
//! An `Action` is an `Arc`, so cloning one (into a namespace merge, or into
//! a middleware's `next`) copies a pointer, never the handler.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResult, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Send` lets tokio move it across worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Internal dispatch interface.
pub(crate) trait ErasedHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>>;
}

// ── Action ────────────────────────────────────────────────────────────────────

/// A fully composed, invocable unit: a middleware chain around a responder.
///
/// Immutable once built; clones share the same chain.
#[derive(Clone)]
pub struct Action(Arc<dyn ErasedHandler>);

impl Action {
    /// Erases any responder into an action with no middleware around it.
    pub fn new(responder: impl Responder) -> Self {
        responder.into_action()
    }

    pub(crate) fn from_erased(handler: impl ErasedHandler) -> Self {
        Self(Arc::new(handler))
    }

    /// Runs the action. Failures from the responder or any middleware come
    /// back unchanged.
    pub fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>> {
        self.0.call(req)
    }

    /// Whether two actions share the same underlying chain.
    pub fn ptr_eq(&self, other: &Action) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

// ── Public Responder trait ────────────────────────────────────────────────────

/// Implemented for every valid terminal request handler.
///
/// You never implement this yourself. It is satisfied by any `async fn` or
/// closure with the signature
///
/// ```text
/// async fn name(req: Request) -> impl IntoResult
/// ```
///
/// and by [`Action`] itself, which is how an already-composed chain becomes
/// the terminal responder of an outer one.
///
/// The trait is **sealed**: only the impls in this module satisfy it.
pub trait Responder: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_action(self) -> Action;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult + 'static,
{
}

impl<F, Fut, R> Responder for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult + 'static,
{
    fn into_action(self) -> Action {
        Action::from_erased(FnHandler(self))
    }
}

impl private::Sealed for Action {}

impl Responder for Action {
    fn into_action(self) -> Action {
        self
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds a concrete responder `F` and implements [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResult + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_result() })
    }
}
