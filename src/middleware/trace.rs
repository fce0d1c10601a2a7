//! Per-request tracing span with method, path, status, and latency.

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use super::{BoxedMiddleware, Middleware};
use crate::error::Error;
use crate::handler::{Action, BoxFuture};
use crate::request::Request;
use crate::response::Response;

/// Returns a middleware that opens a `request` span around the rest of the
/// chain and logs the outcome when it unwinds.
///
/// ```rust
/// use switchyard::{Request, Response, Router, middleware};
///
/// async fn index(_req: Request) -> Response { Response::text("ok") }
///
/// let app = Router::new().get("/", &[middleware::trace()], index);
/// ```
pub fn trace() -> BoxedMiddleware {
    Arc::new(Trace)
}

struct Trace;

impl Middleware for Trace {
    fn handle(&self, req: Request, next: Action) -> BoxFuture<'static, Result<Response, Error>> {
        let span = info_span!("request", method = %req.method(), path = %req.path());

        Box::pin(
            async move {
                let start = Instant::now();
                let result = next.call(req).await;
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

                match &result {
                    Ok(res) => info!(status = res.status_code().as_u16(), latency_ms, "request completed"),
                    Err(e) => warn!(error = %e, latency_ms, "request failed"),
                }
                result
            }
            .instrument(span),
        )
    }
}
