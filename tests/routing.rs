//! End-to-end routing through the public API: build a router, freeze it,
//! answer requests.

use std::sync::{Arc, Mutex};

use switchyard::middleware::{self, BoxedMiddleware};
use switchyard::path::normalize;
use switchyard::{
    Action, Error, Lookup, Method, Request, ResourceController, Response, Router, RoutingController,
    StatusCode,
};

async fn text(res: Response) -> String {
    String::from_utf8(res.body().to_vec()).unwrap()
}

fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> BoxedMiddleware {
    let log = Arc::clone(log);
    middleware::from_fn(move |req, next: Action| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("{name}>"));
            let res = next.call(req).await;
            log.lock().unwrap().push(format!("<{name}"));
            res
        }
    })
}

#[derive(Default)]
struct Comments;

impl ResourceController for Comments {
    async fn index(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("list")) }
    async fn new(&self, _req: Request) -> Result<Response, Error> { Ok(Response::text("form")) }
    async fn show(&self, req: Request) -> Result<Response, Error> {
        Ok(Response::text(format!("comment {}", req.param("id").unwrap_or("?"))))
    }
    async fn edit(&self, req: Request) -> Result<Response, Error> {
        Ok(Response::text(format!("edit {}", req.param("id").unwrap_or("?"))))
    }
    async fn create(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::status(StatusCode::CREATED))
    }
    async fn destroy(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::status(StatusCode::NO_CONTENT))
    }
    async fn update(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::text("updated"))
    }
}

#[derive(Default)]
struct Blog;

impl RoutingController for Blog {
    fn draw(&self, routes: Router) -> Router {
        routes
            .root(&[], |_req: Request| async { "blog" })
            .resources::<Comments>("/comments", &[])
    }
}

#[tokio::test]
async fn namespaced_resources_resolve_with_params() {
    let table = Router::with_root("/api")
        .namespace("/v1", &[], |v1| v1.mount::<Blog>("/blog", &[]))
        .into_table()
        .unwrap();

    let cases = [
        (Method::GET, "/api/v1/blog", StatusCode::OK, "blog"),
        (Method::GET, "/api/v1/blog/comments", StatusCode::OK, "list"),
        (Method::GET, "/api/v1/blog/comments/new", StatusCode::OK, "form"),
        (Method::GET, "/api/v1/blog/comments/7", StatusCode::OK, "comment 7"),
        (Method::GET, "/api/v1/blog/comments/7/edit", StatusCode::OK, "edit 7"),
        (Method::PATCH, "/api/v1/blog/comments/7", StatusCode::OK, "updated"),
        (Method::POST, "/api/v1/blog/comments", StatusCode::CREATED, ""),
        (Method::DELETE, "/api/v1/blog/comments/7", StatusCode::NO_CONTENT, ""),
    ];

    for (method, path, status, body) in cases {
        let res = table.respond(Request::new(method.clone(), path)).await;
        assert_eq!(res.status_code(), status, "{method} {path}");
        assert_eq!(text(res).await, body, "{method} {path}");
    }
}

#[tokio::test]
async fn namespace_middleware_wraps_route_middleware() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let table = Router::new()
        .namespace("/outer", &[recorder("ns1", &log), recorder("ns2", &log)], |outer| {
            outer.get("/leaf", &[recorder("route", &log)], |_req: Request| async { "leaf" })
        })
        .into_table()
        .unwrap();

    let res = table.respond(Request::new(Method::GET, "/outer/leaf")).await;
    assert_eq!(text(res).await, "leaf");
    assert_eq!(
        *log.lock().unwrap(),
        ["ns1>", "ns2>", "route>", "<route", "<ns2", "<ns1"],
    );
}

#[tokio::test]
async fn misses_are_outcomes_not_failures() {
    let table = Router::new()
        .get("/only-get", &[], |_req: Request| async { "ok" })
        .into_table()
        .unwrap();

    assert!(matches!(table.lookup(&Method::GET, "/nope"), Lookup::NotFound));
    match table.lookup(&Method::POST, "/only-get") {
        Lookup::MethodNotAllowed { allowed } => assert_eq!(allowed, [Method::GET, Method::HEAD]),
        other => panic!("unexpected lookup: {other:?}"),
    }
}

#[tokio::test]
async fn reconfiguring_after_clear() {
    let mut router = Router::new()
        .get("/a", &[], |_req: Request| async { "a" })
        .get("/b", &[], |_req: Request| async { "b" });
    router.clear();
    assert_eq!(router.len(), 0);

    let table = router
        .get("/c", &[], |_req: Request| async { "c" })
        .into_table()
        .unwrap();

    assert_eq!(table.routes().len(), 1);
    let res = table.respond(Request::new(Method::GET, "/a")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    let res = table.respond(Request::new(Method::GET, "/c")).await;
    assert_eq!(text(res).await, "c");
}

#[tokio::test]
async fn responses_render_status_line_and_headers() {
    let table = Router::new()
        .post("/things", &[], |_req: Request| async {
            Response::builder()
                .status(StatusCode::CREATED)
                .header("location", "/things/1")
                .no_body()
        })
        .into_table()
        .unwrap();

    let res = table.respond(Request::new(Method::POST, "/things")).await;
    assert_eq!(res.status_line(), "HTTP/1.1 201 Created\n");
    assert_eq!(res.to_string(), "HTTP/1.1 201 Created\nlocation: /things/1\n");
}

#[tokio::test]
async fn configured_trailing_slash_reaches_routes_either_way() {
    let config = switchyard::Config::from_toml(
        "[routing]\nroot = \"/api\"\nappend_trailing_slash = true\n",
    )
    .unwrap();
    let table = Router::from_config(&config.routing)
        .get("/users", &[], |_req: Request| async { "users" })
        .into_table()
        .unwrap();

    for path in ["/api/users", "/api/users/", "/api//users"] {
        let res = table.respond(Request::new(Method::GET, path)).await;
        assert_eq!(text(res).await, "users", "{path}");
    }
}

#[test]
fn normalization_is_idempotent() {
    for p in ["", "/", "a", "//a//", "/a/b/", "a/:id//edit", "///"] {
        for (l, t) in [(true, true), (true, false), (false, true), (false, false)] {
            let once = normalize(p, l, t);
            assert_eq!(normalize(&once, l, t), once);
        }
    }
}
