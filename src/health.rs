//! Built-in Kubernetes health-check routes.
//!
//! Kubernetes asks two questions. [`Health`] answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Mount it wherever the probes should live:
//!
//! ```rust
//! use switchyard::{Router, health::Health};
//!
//! let app = Router::new().mount::<Health>("/", &[]);
//! assert!(app.route("/healthz").is_some());
//! assert!(app.route("/readyz").is_some());
//! ```
//!
//! Register your own readiness responder instead if the pod must gate on
//! dependency availability (database connections, downstream services).

use crate::controller::RoutingController;
use crate::router::Router;
use crate::{Request, Response};

/// A [`RoutingController`] drawing `/healthz` and `/readyz`.
#[derive(Default)]
pub struct Health;

impl RoutingController for Health {
    fn draw(&self, routes: Router) -> Router {
        routes
            .get("/healthz", &[], liveness)
            .get("/readyz", &[], readiness)
    }
}

/// Liveness probe: always `200 OK` with body `"ok"`. If the process can
/// respond to HTTP at all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe (default): `200 OK` with body `"ready"`.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
