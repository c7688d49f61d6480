//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default amount of time a group of servers is allotted to gracefully shut
/// down when one of their peers stops unexpectedly.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Tuning knobs for a server group.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Bound for the automatic cascading shutdown, in milliseconds.
    ///
    /// Ignored when shutdown is requested directly with its own deadline.
    pub shutdown_timeout_ms: u64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT.as_millis() as u64,
        }
    }
}

impl GroupConfig {
    /// The shutdown timeout as a [`Duration`].
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
