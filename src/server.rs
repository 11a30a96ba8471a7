//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`: no new connections are made.
//! 2. Cancelling the [`Context`] of every in-flight request, so actions that
//!    watch it can wrap up early.
//! 3. Letting every in-flight connection task run to completion.
//! 4. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::context::Context;
use crate::error::Error;
use crate::router::Router;

/// The HTTP server.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use resty::{Router, Server};
///
/// # async fn run() -> Result<(), resty::Error> {
/// Server::bind("0.0.0.0:3000")
///     .request_timeout(Duration::from_secs(10))
///     .serve(Router::new())
///     .await
/// # }
/// ```
pub struct Server {
    addr: String,
    request_timeout: Option<Duration>,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. The address is parsed there.
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), request_timeout: None }
    }

    /// Deadline attached to every request [`Context`].
    ///
    /// Actions observe it cooperatively; the server does not abort them.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Accepts connections and dispatches them through `router` until SIGTERM
    /// or Ctrl-C, then drains in-flight requests.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let addr: SocketAddr = self.addr.parse()
            .map_err(|_| Error::InvalidAddress(self.addr.clone()))?;
        let listener = TcpListener::bind(addr).await?;

        // Shared by every connection task; no copy of the routing table.
        let router = Arc::new(router);
        // Parent of every request token: cancelling it reaches all of them.
        let shutdown = CancellationToken::new();
        let request_timeout = self.request_timeout;

        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "resty listening");

        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM immediately stops
                // accepting new connections, even if more are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    shutdown.cancel();
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

                    let router = Arc::clone(&router);
                    let shutdown = shutdown.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let token = shutdown.child_token();
                            let deadline = request_timeout.map(|t| Instant::now() + t);
                            async move {
                                // hyper drops this future when the client goes
                                // away; the guard then cancels the request.
                                let _guard = token.clone().drop_guard();
                                let ctx = Context::new(token, deadline);
                                Ok::<_, std::convert::Infallible>(router.dispatch(req, ctx).await)
                            }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("resty stopped");
        Ok(())
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// A signal handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
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
