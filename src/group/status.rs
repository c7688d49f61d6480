//! Group status state machine.
//!
//! # State Transitions
//! ```text
//! Stopped → Started:  start accepted
//! Started → Stopping: shutdown accepted
//! Stopping → Stopped: shutdown complete
//! ```
//!
//! Every other requested transition is rejected and leaves the status
//! untouched.

use std::fmt;
use std::sync::Mutex;

/// Lifecycle status of a server group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No servers running. Initial and terminal state.
    Stopped,
    /// Startup in progress or complete; servers running.
    Started,
    /// Shutdown in progress.
    Stopping,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Stopped => write!(f, "stopped"),
            Status::Started => write!(f, "started"),
            Status::Stopping => write!(f, "stopping"),
        }
    }
}

/// Lock-guarded status cell. One per group instance.
#[derive(Debug)]
pub(crate) struct StatusCell {
    current: Mutex<Status>,
}

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self {
            current: Mutex::new(Status::Stopped),
        }
    }

    /// Compare the current status to `from` and, on match, set `to` as one
    /// indivisible operation. Returns whether the transition was taken.
    pub(crate) fn transition(&self, from: Status, to: Status) -> bool {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if *current != from {
            return false;
        }
        *current = to;
        true
    }

    pub(crate) fn current(&self) -> Status {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
