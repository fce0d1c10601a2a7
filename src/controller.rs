//! Controller conventions.
//!
//! - [`ResourceController`]: the seven conventional CRUD handlers, wired up
//!   by [`Router::resources`].
//! - [`RoutingController`]: draws an arbitrary set of routes, mounted by
//!   [`Router::mount`].

use std::future::Future;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// A controller answering the conventional resource routes.
///
/// `Router::resources::<C>("/posts", &[])` registers:
///
/// | Method | Path              | Handler   |
/// |--------|-------------------|-----------|
/// | GET    | `/posts`          | `index`   |
/// | GET    | `/posts/new`      | `new`     |
/// | GET    | `/posts/:id`      | `show`    |
/// | GET    | `/posts/:id/edit` | `edit`    |
/// | POST   | `/posts`          | `create`  |
/// | DELETE | `/posts/:id`      | `destroy` |
/// | PATCH  | `/posts/:id`      | `update`  |
///
/// A fresh controller is built with [`Default`] for every request, so
/// controllers carry no state between requests.
///
/// Implement the methods as `async fn`s:
///
/// ```rust
/// use switchyard::{Error, Request, ResourceController, Response};
///
/// #[derive(Default)]
/// struct Posts;
///
/// impl ResourceController for Posts {
///     async fn index(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("all")) }
///     async fn new(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("form")) }
///     async fn show(&self, req: Request) -> Result<Response, Error> {
///         Ok(Response::text(format!("post {}", req.param("id").unwrap_or("?"))))
///     }
///     async fn edit(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("edit")) }
///     async fn create(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("created")) }
///     async fn destroy(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("gone")) }
///     async fn update(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("updated")) }
/// }
/// ```
pub trait ResourceController: Default + Send + Sync + 'static {
    fn index(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
    fn new(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
    fn show(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
    fn edit(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
    fn create(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
    fn destroy(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
    fn update(&self, req: Request) -> impl Future<Output = Result<Response, Error>> + Send;
}

/// A controller that draws its own routes.
///
/// [`Router::mount`] builds one instance and hands it a fresh router scoped
/// to the mount path; whatever `draw` returns is merged into the parent.
pub trait RoutingController: Default {
    fn draw(&self, routes: Router) -> Router;
}
