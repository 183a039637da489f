//! HTTP listener lifecycle: acquire, serve, shut down within a grace period.
//!
//! The listening socket is built with socket2 so SO_REUSEADDR is set before
//! bind; failure to acquire it is fatal to the process. Shutdown is signalled
//! through a `CancellationToken`; a server that outlives the grace period is
//! logged and abandoned.

use std::{io, net::SocketAddr, time::Duration};

use axum::Router;
use log::{info, warn};
use socket2::{Domain, SockAddr, Socket, Type};
use tokio::{net::TcpListener, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Binds `addr` with SO_REUSEADDR. SO_REUSEPORT stays off so a second
/// instance fails here instead of silently sharing the port.
pub fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    let bind = || -> io::Result<TcpListener> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
        socket.set_reuse_address(true)?;
        socket.bind(&SockAddr::from(addr))?;
        socket.listen(128)?;
        socket.set_nonblocking(true)?;
        TcpListener::from_std(socket.into())
    };

    bind().map_err(|source| Error::Bind { addr, source })
}

pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<io::Result<()>>,
}

/// Serves `router` on `listener` in a background task.
pub fn spawn_server(listener: TcpListener, router: Router) -> Result<ServerHandle> {
    let local_addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();

    let task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .await
    });

    info!("[Server] listening on http://{}", local_addr);
    Ok(ServerHandle {
        local_addr,
        shutdown,
        task,
    })
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Requests graceful shutdown and waits up to `grace` for open connections.
    /// Failures are logged only; the caller proceeds to exit either way.
    pub async fn shutdown(self, grace: Duration) {
        self.shutdown.cancel();

        match time::timeout(grace, self.task).await {
            Ok(Ok(Ok(()))) => info!("[Server] stopped"),
            Ok(Ok(Err(e))) => warn!("[Server] exited with error: {}", e),
            Ok(Err(e)) => warn!("[Server] task ended abnormally: {}", e),
            Err(_) => warn!("[Server] forced to shut down after {:?}", grace),
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("[Server] failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("[Server] failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
