//! The route container.
//!
//! A [`Router`] collects routes at startup. Registrations normalize their
//! path against the router's root, land on the one [`Route`] for that path,
//! and store the middleware chain composed around the responder.
//!
//! Nesting is by value: [`Router::namespace`] hands a fresh child router to
//! a builder closure, takes back whatever it returns, and folds the child's
//! routes into the parent. The child never sees the parent's routes and the
//! parent never sees a half-built child.
//!
//! Once configured, freeze it with [`Router::into_table`] (the server does
//! this for you); a [`RouteTable`] is read-only and shared across requests.

use http::Method;
use tracing::debug;

use crate::config::RoutingConfig;
use crate::controller::{ResourceController, RoutingController};
use crate::error::Error;
use crate::handler::Responder;
use crate::middleware::{self, BoxedMiddleware};
use crate::path;
use crate::request::Request;
use crate::route::Route;
use crate::table::RouteTable;

/// A responder that builds a fresh `$controller` and calls `$method` on it.
macro_rules! resource_action {
    ($controller:ty, $method:ident) => {
        |req: Request| async move {
            let controller = <$controller>::default();
            <$controller as ResourceController>::$method(&controller, req).await
        }
    };
}

/// The application route container.
///
/// Each builder call takes `self` and returns it, so registrations chain:
///
/// ```rust
/// use switchyard::{Request, Response, Router};
///
/// # async fn get_user(_: Request) -> Response { Response::text("") }
/// # async fn create_user(_: Request) -> Response { Response::text("") }
/// # async fn delete_user(_: Request) -> Response { Response::text("") }
/// let app = Router::new()
///     .namespace("/api", &[], |api| {
///         api.get("/users/:id", &[], get_user)
///             .post("/users", &[], create_user)
///             .delete("/users/:id", &[], delete_user)
///     });
///
/// assert!(app.route("/api/users/:id").is_some());
/// ```
pub struct Router {
    root: String,
    routes: Vec<Route>,
    append_leading_slash: bool,
    append_trailing_slash: bool,
}

impl Router {
    /// An empty router at the root, leading slash on, trailing slash off.
    pub fn new() -> Self {
        Self::with_root("")
    }

    /// An empty router whose paths are all prefixed with `root`.
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            routes: Vec::new(),
            append_leading_slash: true,
            append_trailing_slash: false,
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::with_root(config.root.clone())
            .leading_slash(config.append_leading_slash)
            .trailing_slash(config.append_trailing_slash)
    }

    /// Whether normalized paths always start with `/`.
    pub fn leading_slash(mut self, append: bool) -> Self {
        self.append_leading_slash = append;
        self
    }

    /// Whether normalized paths always end with `/` (otherwise it is stripped).
    pub fn trailing_slash(mut self, append: bool) -> Self {
        self.append_trailing_slash = append;
        self
    }

    pub fn root_path(&self) -> &str {
        &self.root
    }

    /// Joins `relative` onto the root path and normalizes the result.
    ///
    /// ```rust
    /// use switchyard::Router;
    ///
    /// let api = Router::with_root("/api/");
    /// assert_eq!(api.absolute_path_for("//users/"), "/api/users");
    /// assert_eq!(api.absolute_path_for(""), "/api");
    /// assert_eq!(Router::new().absolute_path_for(""), "/");
    /// ```
    pub fn absolute_path_for(&self, relative: &str) -> String {
        path::normalize(
            &path::join(&self.root, relative),
            self.append_leading_slash,
            self.append_trailing_slash,
        )
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Registers `middleware` + `responder` for `method` at `path`.
    ///
    /// Reuses the route already at that normalized path, if any. Registering
    /// the same method twice replaces the earlier action.
    pub fn add(
        mut self,
        method: Method,
        path: &str,
        middleware: &[BoxedMiddleware],
        responder: impl Responder,
    ) -> Self {
        let action = middleware::chain(middleware, responder);
        let route = self.entry(path);
        debug!(%method, path = route.path(), "route registered");
        if route.add_action(method.clone(), action).is_some() {
            debug!(%method, path = route.path(), "action replaced");
        }
        self
    }

    /// Registers the action used for methods `path` has no action for.
    pub fn fallback(mut self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        let action = middleware::chain(middleware, responder);
        let route = self.entry(path);
        debug!(path = route.path(), "fallback registered");
        route.set_fallback(action);
        self
    }

    pub fn get(self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.add(Method::GET, path, middleware, responder)
    }

    pub fn post(self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.add(Method::POST, path, middleware, responder)
    }

    pub fn put(self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.add(Method::PUT, path, middleware, responder)
    }

    pub fn patch(self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.add(Method::PATCH, path, middleware, responder)
    }

    pub fn delete(self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.add(Method::DELETE, path, middleware, responder)
    }

    pub fn options(self, path: &str, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.add(Method::OPTIONS, path, middleware, responder)
    }

    /// `GET` on the router's own root path.
    pub fn root(self, middleware: &[BoxedMiddleware], responder: impl Responder) -> Self {
        self.get("", middleware, responder)
    }

    /// Drops every route. Root path and slash policies are kept.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    // ── Composition ───────────────────────────────────────────────────────────

    /// Groups the routes drawn by `build` under `path`, wrapped in `middleware`.
    ///
    /// `build` receives an empty router rooted at `path` alone (it does not
    /// see this router's root) with the same slash policies. Every action it
    /// registers is then re-added here at the child route's path, so this
    /// router's root is applied on top and `middleware` ends up outside the
    /// child's own middleware.
    pub fn namespace(
        mut self,
        path: &str,
        middleware: &[BoxedMiddleware],
        build: impl FnOnce(Router) -> Router,
    ) -> Self {
        let child = build(
            Router::with_root(path)
                .leading_slash(self.append_leading_slash)
                .trailing_slash(self.append_trailing_slash),
        );

        for route in child.routes {
            let (child_path, actions, fallback) = route.into_parts();
            for (method, action) in actions {
                self = self.add(method, &child_path, middleware, action);
            }
            if let Some(action) = fallback {
                self = self.fallback(&child_path, middleware, action);
            }
        }
        self
    }

    /// Registers the seven resource routes of `C` under `path`.
    ///
    /// See [`ResourceController`] for the table. Every request gets its own
    /// `C::default()`.
    pub fn resources<C: ResourceController>(self, path: &str, middleware: &[BoxedMiddleware]) -> Self {
        let new_form = path::join(path, "new");
        let member = path::join(path, ":id");
        let edit = path::join(&member, "edit");

        self.get(path, middleware, resource_action!(C, index))
            .get(&new_form, middleware, resource_action!(C, new))
            .get(&member, middleware, resource_action!(C, show))
            .get(&edit, middleware, resource_action!(C, edit))
            .post(path, middleware, resource_action!(C, create))
            .delete(&member, middleware, resource_action!(C, destroy))
            .patch(&member, middleware, resource_action!(C, update))
    }

    /// Lets one `C::default()` draw its routes into a namespace at `path`.
    pub fn mount<C: RoutingController>(self, path: &str, middleware: &[BoxedMiddleware]) -> Self {
        let controller = C::default();
        self.namespace(path, middleware, |routes| controller.draw(routes))
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// Routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The route stored at `path`, compared against normalized paths as stored.
    pub fn route(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path() == path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freezes the routes into a lookup table that normalizes request paths
    /// with this router's slash policies.
    pub fn into_table(self) -> Result<RouteTable, Error> {
        let (leading, trailing) = (self.append_leading_slash, self.append_trailing_slash);
        Ok(RouteTable::new(self.routes)?.slash_policy(leading, trailing))
    }

    fn entry(&mut self, path: &str) -> &mut Route {
        let path = self.absolute_path_for(path);
        match self.routes.iter().position(|r| r.path() == path) {
            Some(i) => &mut self.routes[i],
            None => {
                self.routes.push(Route::new(path));
                let last = self.routes.len() - 1;
                &mut self.routes[last]
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
