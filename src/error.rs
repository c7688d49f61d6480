//! Error types for group lifecycle operations.

use thiserror::Error;

/// Boxed error type used for heterogeneous server failures.
///
/// Servers in a group are free to fail with whatever error type suits them;
/// the group carries the first one observed without inspecting it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for [`ServerGroup`](crate::ServerGroup) operations.
#[derive(Debug, Error)]
pub enum GroupError {
    /// Start was requested while the group was not stopped.
    #[error("server group already started")]
    AlreadyStarted,

    /// Shutdown was requested while the group was not started.
    #[error("server group already stopping or stopped")]
    AlreadyStopping,

    /// The first error observed among the servers of a fan-out operation.
    ///
    /// The original error is preserved and reachable through `source`.
    #[error("{0}")]
    Server(#[source] BoxError),
}
