//! Group lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! start():
//!     status cell: stopped → started
//!     → coordinator.rs fans out one serve() task per server
//!     → any task returning spawns the detached cascading shutdown
//!     → fan-in barrier, collector.rs reduces N outcomes to one
//!
//! shutdown(deadline):
//!     status cell: started → stopping
//!     → fan-out shutdown(deadline) per server
//!     → fan-in, stopping → stopped, collector result returned
//! ```
//!
//! # Design Decisions
//! - The status cell is the only locked shared state in the group
//! - Concurrent shutdown attempts resolve through the atomic transition;
//!   exactly one proceeds, the rest fail with a state-conflict error
//! - The cascade is never awaited by the serve task that triggered it

mod collector;

pub mod coordinator;
pub mod status;

pub use coordinator::{GroupBuilder, ServerGroup};
pub use status::Status;
