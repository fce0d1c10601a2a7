//! Minimal switchyard app: resource routes, a mounted controller, namespaces
//! with middleware, and health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/api/posts/42
//!   curl -X POST http://localhost:3000/api/posts -d '{"title":"hi"}'
//!   curl -X PATCH http://localhost:3000/api/posts/42 -H 'authorization: Bearer x'
//!   curl http://localhost:3000/healthz

use switchyard::middleware::{self, BoxedMiddleware};
use switchyard::{
    Config, Error, Request, ResourceController, Response, Router, Server, StatusCode, health::Health,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let app = Router::from_config(&config.routing)
        .mount::<Health>("/", &[])
        .root(&[], |_req: Request| async { "switchyard demo" })
        .namespace("/api", &[middleware::trace()], |api| {
            api.resources::<Posts>("/posts", &[])
                .namespace("/admin", &[require_auth()], |admin| {
                    admin.delete("/cache", &[], |_req: Request| async { StatusCode::NO_CONTENT })
                })
        });

    Server::from_config(&config.server)?.serve(app).await
}

fn require_auth() -> BoxedMiddleware {
    middleware::from_fn(|req: Request, next| async move {
        if req.header("authorization").is_none() {
            return Ok(Response::status(StatusCode::UNAUTHORIZED));
        }
        next.call(req).await
    })
}

#[derive(Default)]
struct Posts;

impl ResourceController for Posts {
    async fn index(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::json(r#"[{"id":"42","title":"hello"}]"#))
    }

    async fn new(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::builder()
            .bytes(switchyard::ContentType::Html, "<form method=post></form>"))
    }

    async fn show(&self, req: Request) -> Result<Response, Error> {
        let id = req.param("id").unwrap_or("unknown");
        Ok(Response::json(format!(r#"{{"id":"{id}","title":"hello"}}"#)))
    }

    async fn edit(&self, req: Request) -> Result<Response, Error> {
        let id = req.param("id").unwrap_or("unknown");
        Ok(Response::text(format!("editing {id}")))
    }

    async fn create(&self, req: Request) -> Result<Response, Error> {
        if req.body().is_empty() {
            return Ok(Response::status(StatusCode::BAD_REQUEST));
        }
        Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/api/posts/99")
            .json(r#"{"id":"99"}"#))
    }

    async fn destroy(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::status(StatusCode::NO_CONTENT))
    }

    async fn update(&self, _req: Request) -> Result<Response, Error> {
        Err(Error::handler("posts are read-only in the demo"))
    }
}
