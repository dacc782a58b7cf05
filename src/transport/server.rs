//! # Device Server
//!
//! Binds the listen socket, accepts connections, and spawns one session
//! task per peer. Shutdown is driven through an mpsc channel so callers
//! (and tests) can stop the accept loop deterministically; `serve` wires
//! that channel to CTRL+C for the common case.

use crate::core::registry::CounterRegistry;
use crate::transport::session;
use crate::utils::metrics::Metrics;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// TCP server counting device messages into a shared registry.
pub struct DeviceServer {
    listener: TcpListener,
    registry: Arc<CounterRegistry>,
    metrics: Arc<Metrics>,
    max_connections: usize,
}

impl DeviceServer {
    /// Bind the listen socket. The registry is shared with every session
    /// this server will spawn.
    pub async fn bind(
        addr: &str,
        registry: Arc<CounterRegistry>,
        metrics: Arc<Metrics>,
    ) -> crate::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Listening for device connections");
        Ok(Self {
            listener,
            registry,
            metrics,
            max_connections: 1000,
        })
    }

    /// Cap the number of concurrently served connections. Peers accepted
    /// above the cap are dropped immediately.
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// The address the server is actually bound to (useful with port 0).
    pub fn local_addr(&self) -> crate::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until CTRL+C.
    pub async fn serve(self) -> crate::Result<()> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received CTRL+C signal, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
        });

        self.serve_with_shutdown(shutdown_rx).await
    }

    /// Serve until a message arrives on the shutdown channel (or it
    /// closes). Sessions already running are detached tasks; they finish
    /// on their own when their peers disconnect.
    pub async fn serve_with_shutdown(
        self,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> crate::Result<()> {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down, no longer accepting connections");
                    return Ok(());
                }

                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => {
                            if self.metrics.connections_active() >= self.max_connections as u64 {
                                warn!(%peer, max = self.max_connections, "Connection limit reached, dropping peer");
                                drop(stream);
                                continue;
                            }

                            info!(%peer, "Accepted device connection");
                            self.metrics.connection_established();

                            let registry = Arc::clone(&self.registry);
                            let metrics = Arc::clone(&self.metrics);
                            tokio::spawn(async move {
                                session::run(stream, peer, registry, Arc::clone(&metrics)).await;
                                metrics.connection_closed();
                            });
                        }
                        Err(e) => {
                            // Transient accept failures must not stop the
                            // listener; other connections are unaffected.
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }
    }
}
