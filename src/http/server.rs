//! HTTP server implementation of the group server contract.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::error::BoxError;
use crate::server::{Deadline, Server};

/// An axum-backed HTTP server that can be started and stopped as part of a
/// group.
///
/// Binds its listener when [`serve`](Server::serve) runs and drains in-flight
/// connections on stop. Like the listeners it wraps, a stopped instance stays
/// stopped; build a fresh one to serve again.
pub struct HttpServer {
    name: String,
    addr: SocketAddr,
    router: Router,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    finished_tx: watch::Sender<bool>,
    finished_rx: watch::Receiver<bool>,
}

impl HttpServer {
    /// Create a server for `router`, bound to `addr` once served.
    pub fn new(name: impl Into<String>, addr: SocketAddr, router: Router) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (finished_tx, finished_rx) = watch::channel(false);
        Self {
            name: name.into(),
            addr,
            router: router.layer(TraceLayer::new_for_http()),
            stop_tx,
            stop_rx,
            finished_tx,
            finished_rx,
        }
    }

    /// The address the server binds to when served.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn run(&self) -> Result<(), BoxError> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(server = %self.name, address = %local_addr, "HTTP server listening");

        // Level-triggered stop: a request that arrived before the listener
        // came up still takes effect.
        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(flagged(self.stop_rx.clone()))
            .await?;

        tracing::info!(server = %self.name, "HTTP server stopped");
        Ok(())
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn serve(&self) -> Result<(), BoxError> {
        let result = self.run().await;
        let _ = self.finished_tx.send(true);
        result
    }

    async fn shutdown(&self, deadline: Deadline) -> Result<(), BoxError> {
        tracing::debug!(server = %self.name, "graceful stop requested");
        let _ = self.stop_tx.send(true);

        let drained = flagged(self.finished_rx.clone());
        match deadline.instant() {
            Some(at) => tokio::time::timeout_at(at, drained).await?,
            None => drained.await,
        }
        Ok(())
    }
}

/// Resolve once the watched flag is raised.
async fn flagged(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}
