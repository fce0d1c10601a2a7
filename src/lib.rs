//! # switchyard
//!
//! A small HTTP framework: a route container with nested namespaces,
//! resource controllers, and middleware chains, served by hyper.
//!
//! ## The model
//!
//! - A [`Router`] collects [`Route`]s at startup. Each route is one
//!   normalized path with one [`Action`] per method and an optional fallback.
//! - An [`Action`] is a [`Responder`] wrapped in its middleware chain,
//!   composed once by [`middleware::chain`] and shared from then on.
//! - [`Router::namespace`], [`Router::resources`] and [`Router::mount`] build
//!   child routers by value and fold their routes into the parent.
//! - [`Router::into_table`] freezes everything into a read-only
//!   [`RouteTable`] for request-time lookup (radix tree via [`matchit`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use switchyard::{Error, Request, Response, Router, Server, StatusCode, health::Health, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new()
//!         .mount::<Health>("/", &[])
//!         .namespace("/api", &[middleware::trace()], |api| {
//!             api.get("/users/:id", &[], get_user)
//!                 .post("/users", &[], create_user)
//!         });
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Result<Response, Error> {
//!     if req.body().is_empty() {
//!         return Ok(Response::status(StatusCode::BAD_REQUEST));
//!     }
//!     Ok(Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/api/users/99")
//!         .json(r#"{"id":"99"}"#))
//! }
//! ```

mod controller;
mod error;
mod handler;
mod request;
mod response;
mod route;
mod router;
mod server;
mod table;

pub mod config;
pub mod health;
pub mod middleware;
pub mod path;

pub use config::Config;
pub use controller::{ResourceController, RoutingController};
pub use error::{BoxError, Error};
pub use handler::{Action, BoxFuture, Responder};
pub use http::{Method, StatusCode};
pub use request::{Params, Request};
pub use response::{ContentType, IntoResponse, IntoResult, Io, Response, ResponseBuilder, Upgrade};
pub use route::Route;
pub use router::Router;
pub use server::Server;
pub use table::{Lookup, RouteTable};
