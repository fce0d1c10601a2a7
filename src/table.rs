//! Frozen route lookup.
//!
//! One radix tree over every route path, O(path-length) lookup via
//! [`matchit`]. Each leaf points at the [`Route`] holding the per-method
//! actions, so method resolution (and the fallback) happens after the path
//! matched.
//!
//! Request paths go through the same [`path::normalize`] as registered ones,
//! so `/users/` and `//users` reach the route stored as `/users`. `HEAD` on
//! a path with no `HEAD` action runs its `GET` action and drops the body.

use http::{Method, StatusCode, header};
use matchit::Router as MatchitRouter;
use tracing::error;

use crate::error::Error;
use crate::handler::Action;
use crate::path;
use crate::request::{Params, Request};
use crate::response::Response;
use crate::route::Route;

/// The read-only, lookup-side form of a [`Router`](crate::Router).
///
/// Build it once at startup with [`Router::into_table`](crate::Router::into_table);
/// share it with `Arc` across every connection.
pub struct RouteTable {
    routes: Vec<Route>,
    tree: MatchitRouter<usize>,
    append_leading_slash: bool,
    append_trailing_slash: bool,
}

/// The outcome of a lookup. Misses are ordinary outcomes, not errors.
#[derive(Debug)]
pub enum Lookup<'a> {
    /// An action (or the route's fallback) plus the URL parameters.
    Matched { action: &'a Action, params: Params },
    /// The path exists but has no action for the method and no fallback.
    MethodNotAllowed { allowed: Vec<Method> },
    NotFound,
}

impl RouteTable {
    /// Indexes `routes` by path. Fails on a path the tree rejects, such as
    /// a catch-all that is not the last segment.
    pub fn new(routes: Vec<Route>) -> Result<Self, Error> {
        let mut tree = MatchitRouter::new();
        for (i, route) in routes.iter().enumerate() {
            tree.insert(pattern(route.path()), i).map_err(|source| Error::Route {
                path: route.path().to_owned(),
                source,
            })?;
        }
        Ok(Self { routes, tree, append_leading_slash: true, append_trailing_slash: false })
    }

    /// Normalizes request paths with these policies; match them to the
    /// router the routes came from.
    pub fn slash_policy(mut self, append_leading_slash: bool, append_trailing_slash: bool) -> Self {
        self.append_leading_slash = append_leading_slash;
        self.append_trailing_slash = append_trailing_slash;
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the action for `method` at `path`.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let path = path::normalize(path, self.append_leading_slash, self.append_trailing_slash);
        let Ok(matched) = self.tree.at(&path) else {
            return Lookup::NotFound;
        };
        let route = &self.routes[*matched.value];

        let action = route
            .action(method)
            .or_else(|| (*method == Method::HEAD).then(|| route.action(&Method::GET)).flatten())
            .or(route.fallback());

        match action {
            Some(action) => Lookup::Matched {
                action,
                params: matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
            },
            None => Lookup::MethodNotAllowed { allowed: allowed_methods(route) },
        }
    }

    /// Routes and runs one request, always producing a response.
    ///
    /// Misses become `404` / `405` (with `Allow`). A failed action is logged
    /// and answered with `500`; its error goes no further.
    pub async fn respond(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Lookup::Matched { action, params } => {
                let method = req.method().clone();
                let path = req.path().to_owned();
                req.set_params(params);
                match action.call(req).await {
                    Ok(res) if method == Method::HEAD => res.without_body(),
                    Ok(res) => res,
                    Err(e) => {
                        error!(%method, %path, error = %e, "request failed");
                        Response::status(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }
            }
            Lookup::MethodNotAllowed { allowed } => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                Response::status(StatusCode::METHOD_NOT_ALLOWED)
                    .with_header(header::ALLOW.as_str(), &allow)
            }
            Lookup::NotFound => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

/// The route's methods, plus `HEAD` wherever `GET` answers it.
fn allowed_methods(route: &Route) -> Vec<Method> {
    let mut allowed = route.methods();
    if route.action(&Method::GET).is_some() && route.action(&Method::HEAD).is_none() {
        allowed.push(Method::HEAD);
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    }
    allowed
}

/// Rewrites `:name` and `*name` segments into matchit's `{name}` and
/// `{*name}`, escaping literal braces.
fn pattern(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.replace('{', "{{").replace('}', "}}")
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;

    async fn show(req: Request) -> Response {
        Response::text(format!("user {}", req.param("id").unwrap_or("?")))
    }

    async fn ok(_req: Request) -> Response { Response::text("ok") }

    async fn broken(_req: Request) -> Result<Response, Error> {
        Err(Error::handler("boom"))
    }

    #[test]
    fn placeholders_translate() {
        assert_eq!(pattern("/users/:id"), "/users/{id}");
        assert_eq!(pattern("/files/*rest"), "/files/{*rest}");
        assert_eq!(pattern("/a/{literal}"), "/a/{{literal}}");
        assert_eq!(pattern("/"), "/");
    }

    #[tokio::test]
    async fn matched_requests_see_their_params() {
        let table = Router::new().get("/users/:id", &[], show).into_table().unwrap();

        let res = table.respond(Request::new(Method::GET, "/users/42")).await;
        assert_eq!(res.body().as_ref(), b"user 42");
    }

    #[tokio::test]
    async fn static_segments_beat_placeholders() {
        async fn new_form(_req: Request) -> Response { Response::text("form") }

        let table = Router::new()
            .get("/posts/:id", &[], show)
            .get("/posts/new", &[], new_form)
            .into_table()
            .unwrap();

        let res = table.respond(Request::new(Method::GET, "/posts/new")).await;
        assert_eq!(res.body().as_ref(), b"form");
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let table = Router::new().get("/a", &[], ok).into_table().unwrap();

        assert!(matches!(table.lookup(&Method::GET, "/b"), Lookup::NotFound));
        let res = table.respond(Request::new(Method::GET, "/b")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unmapped_methods_are_405_with_allow() {
        let table = Router::new().get("/a", &[], ok).post("/a", &[], ok).into_table().unwrap();

        let res = table.respond(Request::new(Method::DELETE, "/a")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header("allow"), Some("GET, HEAD, POST"));
    }

    #[tokio::test]
    async fn request_paths_are_normalized_like_routes() {
        let table = Router::new().get("/users", &[], ok).into_table().unwrap();

        for path in ["/users", "/users/", "//users", "users"] {
            let res = table.respond(Request::new(Method::GET, path)).await;
            assert_eq!(res.status_code(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn trailing_slash_tables_accept_bare_paths() {
        let table = Router::new()
            .trailing_slash(true)
            .get("/users/:id", &[], show)
            .into_table()
            .unwrap();

        for path in ["/users/7", "/users/7/"] {
            let res = table.respond(Request::new(Method::GET, path)).await;
            assert_eq!(res.body().as_ref(), b"user 7", "{path}");
        }
    }

    #[tokio::test]
    async fn head_runs_get_without_the_body() {
        let table = Router::new().get("/a", &[], ok).into_table().unwrap();

        let res = table.respond(Request::new(Method::HEAD, "/a")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.body().is_empty());
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[tokio::test]
    async fn explicit_head_actions_win() {
        async fn head_only(_req: Request) -> Response {
            Response::status(StatusCode::NO_CONTENT)
        }

        let table = Router::new()
            .get("/a", &[], ok)
            .add(Method::HEAD, "/a", &[], head_only)
            .into_table()
            .unwrap();

        let res = table.respond(Request::new(Method::HEAD, "/a")).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn fallback_answers_unmapped_methods() {
        let table = Router::new()
            .get("/a", &[], show)
            .fallback("/a", &[], ok)
            .into_table()
            .unwrap();

        let Lookup::Matched { action, .. } = table.lookup(&Method::PUT, "/a") else {
            panic!("expected the fallback");
        };
        let res = action.call(Request::new(Method::PUT, "/a")).await.unwrap();
        assert_eq!(res.body().as_ref(), b"ok");
    }

    #[tokio::test]
    async fn failures_become_500() {
        let table = Router::new().get("/", &[], broken).into_table().unwrap();

        let res = table.respond(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_catch_alls_are_rejected() {
        let err = Router::new()
            .get("/files/*rest/meta", &[], ok)
            .into_table()
            .err()
            .expect("catch-all must be last");

        assert!(matches!(err, Error::Route { ref path, .. } if path == "/files/*rest/meta"));
    }
}
