//! The server group coordinator.
//!
//! # Responsibilities
//! - Own the fixed server set and the group's lifecycle status
//! - Fan out start and stop work, one task per server, and fan back in
//! - Trigger the cascading shutdown when any server's serve task returns
//!
//! # Design Decisions
//! - One tokio task per server; the enclosing call returns only after every
//!   task has completed
//! - Completion order, not list order, decides which outcome is surfaced
//! - The cascade runs detached from the serve task that triggered it

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::config::{GroupConfig, DEFAULT_SHUTDOWN_TIMEOUT};
use crate::error::{BoxError, GroupError};
use crate::group::collector::Collector;
use crate::group::status::{Status, StatusCell};
use crate::server::{Deadline, Server};

/// Grace period assumed sufficient for a freshly issued start task to have
/// begun listening. A heuristic with no correctness guarantee; it is the
/// fallback for servers that expose no explicit readiness signal.
const STARTUP_GRACE: Duration = Duration::from_millis(5);

/// A group of servers that start and stop together.
///
/// The server set is fixed at construction. Once started, the first server
/// to stop, for any reason, takes the whole group down with it: its exit
/// triggers a graceful shutdown of every peer, bounded by the configured
/// shutdown timeout.
///
/// Cloning is cheap; clones are handles onto the same group.
#[derive(Clone)]
pub struct ServerGroup {
    inner: Arc<GroupInner>,
}

struct GroupInner {
    servers: Vec<Arc<dyn Server>>,
    shutdown_timeout: Duration,
    status: StatusCell,
}

impl ServerGroup {
    /// Create a group over `servers` with default settings.
    pub fn new(servers: Vec<Arc<dyn Server>>) -> Self {
        Self::builder().servers(servers).build()
    }

    /// Start building a group.
    pub fn builder() -> GroupBuilder {
        GroupBuilder::new()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> Status {
        self.inner.status.current()
    }

    /// Bound used for the automatic cascading shutdown.
    pub fn shutdown_timeout(&self) -> Duration {
        self.inner.shutdown_timeout
    }

    /// Start every server in the group and run until all of them have
    /// stopped.
    ///
    /// Returns [`GroupError::AlreadyStarted`] immediately, without touching
    /// any server, when the group is not stopped.
    ///
    /// Each server's serve task, on return, kicks off a graceful shutdown of
    /// the whole group bounded by the shutdown timeout, so a single server
    /// stopping or failing brings the rest down with it. The call returns
    /// once every serve call has returned, yielding the first outcome
    /// observed across the group.
    ///
    /// A group that has fully stopped holds no per-start state and may be
    /// started again.
    pub async fn start(&self) -> Result<(), GroupError> {
        if !self.inner.status.transition(Status::Stopped, Status::Started) {
            return Err(GroupError::AlreadyStarted);
        }

        tracing::info!(servers = self.inner.servers.len(), "server group starting");
        let result = self.inner.clone().execute(serve_logged, true).await;
        log_group_result(&result);
        result
    }

    /// Start the group and additionally shut it down when `signal` completes.
    ///
    /// Waits until every server is assumed to be running (a short fixed grace
    /// delay after each start task is issued; servers offer no explicit
    /// readiness callback), then watches `signal` from a background task.
    /// When it fires, a graceful shutdown of the group begins, bounded by the
    /// shutdown timeout. The watcher is torn down when this call returns.
    ///
    /// Returns the same aggregate result as [`start`](ServerGroup::start),
    /// or [`GroupError::AlreadyStarted`] when the group is not stopped.
    pub async fn start_with_shutdown<F>(&self, signal: F) -> Result<(), GroupError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.inner.status.transition(Status::Stopped, Status::Started) {
            return Err(GroupError::AlreadyStarted);
        }

        let servers = self.inner.servers.len();
        tracing::info!(servers, "server group starting");

        let (ready_tx, mut ready_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = oneshot::channel();

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let task = move |server: Arc<dyn Server>| {
                let ready_tx = ready_tx.clone();
                async move {
                    tokio::spawn(async move {
                        tokio::time::sleep(STARTUP_GRACE).await;
                        let _ = ready_tx.send(());
                    });
                    serve_logged(server).await
                }
            };
            let _ = result_tx.send(inner.execute(task, true).await);
        });

        for _ in 0..servers {
            if ready_rx.recv().await.is_none() {
                break;
            }
        }

        let (disarm_tx, disarm_rx) = oneshot::channel::<()>();
        let watcher = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = signal => {
                    tracing::info!("shutdown signal received");
                    let _ = watcher.spawn_cascade();
                }
                _ = disarm_rx => {}
            }
        });

        let result = result_rx
            .await
            .expect("serve fan-out task exited without a result");
        drop(disarm_tx);
        log_group_result(&result);
        result
    }

    /// Gracefully shut down every server in the group, passing `deadline`
    /// through to each.
    ///
    /// Returns [`GroupError::AlreadyStopping`] immediately, without touching
    /// any server, when the group is not started. Otherwise waits for every
    /// server's stop call to complete, returns the group to stopped, and
    /// yields the first outcome observed among the stop calls.
    ///
    /// How long each server is given is governed by `deadline`; honoring it
    /// is the server implementation's responsibility.
    pub async fn shutdown(&self, deadline: Deadline) -> Result<(), GroupError> {
        self.inner.clone().shutdown(deadline).await
    }
}

impl GroupInner {
    async fn shutdown(self: Arc<Self>, deadline: Deadline) -> Result<(), GroupError> {
        if !self.status.transition(Status::Started, Status::Stopping) {
            return Err(GroupError::AlreadyStopping);
        }

        tracing::info!(servers = self.servers.len(), "server group stopping");
        let result = self
            .clone()
            .execute(move |server| shutdown_logged(server, deadline), false)
            .await;
        self.status.transition(Status::Stopping, Status::Stopped);

        match &result {
            Ok(()) => tracing::info!("server group stopped"),
            Err(err) => tracing::warn!(error = %err, "server group stopped with error"),
        }
        result
    }

    /// Run `task` against every server concurrently and reduce the outcomes
    /// to the first one observed.
    ///
    /// With `cascade` set, each task's return additionally kicks off a
    /// group-wide shutdown bounded by the shutdown timeout.
    async fn execute<F, Fut>(self: Arc<Self>, task: F, cascade: bool) -> Result<(), GroupError>
    where
        F: Fn(Arc<dyn Server>) -> Fut,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let collector = Collector::new();
        let mut tasks = JoinSet::new();

        for server in &self.servers {
            tasks.spawn(task(Arc::clone(server)));
        }

        let mut cascades = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            // Any server returning means the whole group should stop. The
            // cascade runs as its own task, never awaited by the serve task
            // that triggered it: a server's stop handshake may depend on its
            // serve task having returned first.
            if cascade {
                cascades.push(self.clone().spawn_cascade());
            }
            match joined {
                Ok(outcome) => collector.apply(outcome),
                Err(err) => {
                    tracing::error!(error = %err, "server task aborted");
                    collector.apply(Err(Box::new(err)));
                }
            }
        }

        // Settle the cascades before returning so a later start cannot race
        // a stale one. All serve tasks are done, so this cannot deadlock.
        for handle in cascades {
            let _ = handle.await;
        }

        collector.into_result().map_err(GroupError::Server)
    }

    /// Kick off the automatic cascading shutdown as a detached task.
    ///
    /// Losing the race against a concurrent shutdown is expected and
    /// harmless; the state conflict is logged and dropped.
    fn spawn_cascade(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let deadline = Deadline::after(self.shutdown_timeout);
            match self.clone().shutdown(deadline).await {
                Ok(()) => {}
                Err(GroupError::AlreadyStopping) => {
                    tracing::debug!("cascading shutdown suppressed; group already stopping or stopped");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cascading shutdown finished with error");
                }
            }
        })
    }
}

/// Builder for [`ServerGroup`].
///
/// Consuming the builder at [`build`](GroupBuilder::build) confines every
/// option to before the group can be started.
pub struct GroupBuilder {
    servers: Vec<Arc<dyn Server>>,
    shutdown_timeout: Duration,
}

impl GroupBuilder {
    fn new() -> Self {
        Self {
            servers: Vec::new(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Add a server to the group.
    pub fn server(mut self, server: Arc<dyn Server>) -> Self {
        self.servers.push(server);
        self
    }

    /// Add every server from `servers` to the group.
    pub fn servers<I>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Server>>,
    {
        self.servers.extend(servers);
        self
    }

    /// Bound for the automatic cascading shutdown triggered when a server
    /// stops unexpectedly.
    ///
    /// Ignored when [`ServerGroup::shutdown`] is called directly with its own
    /// deadline.
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Apply settings loaded from a [`GroupConfig`].
    pub fn config(mut self, config: &GroupConfig) -> Self {
        self.shutdown_timeout = config.shutdown_timeout();
        self
    }

    /// Finish building the group.
    pub fn build(self) -> ServerGroup {
        ServerGroup {
            inner: Arc::new(GroupInner {
                servers: self.servers,
                shutdown_timeout: self.shutdown_timeout,
                status: StatusCell::new(),
            }),
        }
    }
}

async fn serve_logged(server: Arc<dyn Server>) -> Result<(), BoxError> {
    tracing::debug!(server = server.name(), "server starting");
    let outcome = server.serve().await;
    match &outcome {
        Ok(()) => tracing::debug!(server = server.name(), "server stopped"),
        Err(err) => {
            tracing::warn!(server = server.name(), error = %err, "server exited with error");
        }
    }
    outcome
}

async fn shutdown_logged(server: Arc<dyn Server>, deadline: Deadline) -> Result<(), BoxError> {
    tracing::debug!(server = server.name(), "stopping server");
    let outcome = server.shutdown(deadline).await;
    if let Err(err) = &outcome {
        tracing::warn!(server = server.name(), error = %err, "server stop failed");
    }
    outcome
}

fn log_group_result(result: &Result<(), GroupError>) {
    match result {
        Ok(()) => tracing::info!("all servers returned"),
        Err(err) => tracing::warn!(error = %err, "server group run finished with error"),
    }
}
