//! The server capability contract consumed by the group.
//!
//! # Responsibilities
//! - Define what it means to be a member of a server group
//! - Carry the graceful-stop deadline from the caller to each server
//!
//! # Design Decisions
//! - `serve` blocks for the server's entire running lifetime
//! - Deadline enforcement is the server's job; the group only propagates it
//! - Trait objects (`Arc<dyn Server>`) so heterogeneous servers mix freely

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::BoxError;

/// Something that can be started and shut down as part of a group.
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Stable identifier used in log fields.
    fn name(&self) -> &str;

    /// Run the server until it stops or fails.
    ///
    /// Returns `Ok` on graceful stop and an error otherwise. Must return
    /// promptly once [`shutdown`](Server::shutdown) has been invoked.
    async fn serve(&self) -> Result<(), BoxError>;

    /// Request graceful termination, respecting `deadline`.
    ///
    /// Exceeding the deadline surfaces as the expiry's own error; it is not
    /// enforced by the group beyond being passed through here.
    async fn shutdown(&self, deadline: Deadline) -> Result<(), BoxError>;
}

/// Point in time by which a graceful stop should complete.
///
/// A background deadline never expires and is the analogue of shutting down
/// with no time bound at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn background() -> Self {
        Self { at: None }
    }

    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// A deadline at the given instant.
    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// The underlying instant, if any.
    pub fn instant(&self) -> Option<Instant> {
        self.at
    }

    /// Time left until expiry. `None` for background deadlines.
    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has already passed.
    pub fn is_expired(&self) -> bool {
        matches!(self.at, Some(at) if at <= Instant::now())
    }

    /// Wait until the deadline expires.
    ///
    /// Pends forever for background deadlines.
    pub async fn expired(&self) {
        match self.at {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }
}
