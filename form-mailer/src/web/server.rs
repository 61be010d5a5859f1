//! Connection serving with fixed timeouts and a bounded graceful shutdown.
//!
//! Each accepted connection is driven by hyper directly so that reading the
//! request head and idling between requests can be bounded; the request
//! itself is bounded by the router's `TimeoutLayer`.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{debug, info, warn};

use crate::web::idle::IdleTimeout;

/// How long in-flight requests get to finish after a shutdown signal.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Per-connection timeouts.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionTimeouts {
    /// Time allowed for a client to send a full request head
    pub header_read: Duration,
    /// Time a connection may go without any traffic
    pub idle: Duration,
}

impl Default for ConnectionTimeouts {
    fn default() -> Self {
        Self {
            header_read: Duration::from_secs(15),
            idle: Duration::from_secs(60),
        }
    }
}

/// Serve `app` until `shutdown` resolves, then give in-flight requests up to
/// `grace` to complete.
///
/// Returns once every connection has drained or the grace period ran out.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    timeouts: ConnectionTimeouts,
    shutdown: F,
    grace: Duration,
) where
    F: Future<Output = ()> + Send,
{
    // Connections watch `stop`; `open` is dropped by each connection task,
    // so `open_tx.closed()` resolves when all of them are gone.
    let (stop_tx, stop_rx) = watch::channel(());
    let (open_tx, open_rx) = watch::channel(());

    tokio::pin!(shutdown);

    loop {
        let (stream, remote) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "web_server_accept_failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            },
            _ = &mut shutdown => break,
        };

        let io = TokioIo::new(IdleTimeout::new(stream, timeouts.idle));
        let service = TowerToHyperService::new(app.clone());
        let mut stop_rx = stop_rx.clone();
        let open_rx = open_rx.clone();

        tokio::spawn(async move {
            let mut builder = Builder::new(TokioExecutor::new());
            builder
                .http1()
                .timer(TokioTimer::new())
                .header_read_timeout(timeouts.header_read);

            let conn = builder.serve_connection(io, service);
            tokio::pin!(conn);

            let result = tokio::select! {
                result = conn.as_mut() => result,
                _ = stop_rx.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.as_mut().await
                }
            };

            if let Err(e) = result {
                debug!(remote = %remote, error = %e, "connection_closed_with_error");
            }
            drop(open_rx);
        });
    }

    drop(listener);
    info!(grace_seconds = grace.as_secs(), "web_server_draining");

    let _ = stop_tx.send(());
    drop(stop_rx);
    drop(open_rx);

    if tokio::time::timeout(grace, open_tx.closed()).await.is_err() {
        warn!(grace_seconds = grace.as_secs(), "web_server_grace_period_elapsed");
    }
}

/// Create a future that completes when a shutdown signal is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "sigint_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
