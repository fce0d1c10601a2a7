//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`; no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! # Protocol upgrades
//!
//! A responder that answers `101 Switching Protocols` with an
//! [`on_upgrade`](crate::Response::on_upgrade) callback gets the raw
//! connection once hyper has sent the response. The callback runs on its own
//! task; its failure is logged and closes that connection only.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::table::RouteTable;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust
    /// use switchyard::Server;
    ///
    /// assert!(Server::bind("0.0.0.0:3000").is_ok());
    /// assert!(Server::bind("nowhere").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self { addr: addr.parse()? })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, Error> {
        Self::bind(&config.addr)
    }

    /// Freezes `router`, then accepts connections and dispatches them.
    ///
    /// Fails early if the routes cannot be indexed or the address cannot be
    /// bound. Otherwise returns only after a full graceful shutdown (SIGTERM
    /// or Ctrl-C, followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let table = Arc::new(router.into_table()?);
        let listener = TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, routes = table.routes().len(), "switchyard listening");
        accept_loop(listener, table, shutdown_signal()).await;
        info!("switchyard stopped");
        Ok(())
    }
}

/// Serves connections from `listener` until `shutdown` resolves, then waits
/// for the in-flight ones.
async fn accept_loop(listener: TcpListener, table: Arc<RouteTable>, shutdown: impl Future<Output = ()>) {
    // Tracks every connection task so shutdown can wait for them.
    let mut tasks = tokio::task::JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Check shutdown first so a SIGTERM stops accepting at once,
            // even if more connections are queued.
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let table = Arc::clone(&table);
                let io = TokioIo::new(stream);

                tasks.spawn(async move {
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let table = Arc::clone(&table);
                        async move { dispatch(table, req).await }
                    });

                    // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection_with_upgrades(io, svc)
                        .await
                    {
                        error!(peer = %remote_addr, "connection error: {e}");
                    }
                });
            }

            // Reap finished tasks so the set does not grow without bound.
            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response.
///
/// Every failure is answered here (400 for an unreadable body, 404/405/500
/// from the table), so hyper never sees an error.
async fn dispatch(
    table: Arc<RouteTable>,
    mut req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let on_upgrade = hyper::upgrade::on(&mut req);
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_http());
        }
    };

    let request = Request::from_parts(parts, body);
    // Only upgrade callbacks need the request after the responder took it.
    let handshake = request.is_upgrade().then(|| request.clone());

    let mut response = table.respond(request).await;

    if response.status_code() == StatusCode::SWITCHING_PROTOCOLS {
        if let (Some(upgrade), Some(handshake)) = (response.take_upgrade(), handshake) {
            tokio::spawn(async move {
                let upgraded = match on_upgrade.await {
                    Ok(upgraded) => upgraded,
                    Err(e) => {
                        error!(error = %e, "upgrade handshake failed");
                        return;
                    }
                };
                let path = handshake.path().to_owned();
                if let Err(e) = upgrade.run(handshake, Box::new(TokioIo::new(upgraded))).await {
                    error!(%path, error = %e, "upgraded connection failed");
                }
            });
        }
    }

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available. A signal that cannot be installed
/// is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
