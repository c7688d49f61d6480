//! Lifecycle coordination for groups of network servers.
//!
//! A [`ServerGroup`] owns a fixed set of servers and drives them as a single
//! logical unit: all start together, and when any one of them stops, by
//! request or by failure, the rest are gracefully shut down within a bounded
//! time window.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────┐
//!                 │                 SERVER GROUP                   │
//!                 │                                                │
//!   start() ──────┼─▶ status cell ──▶ fan-out: one task per        │
//!                 │   (stopped →       server, serve() blocks      │
//!                 │    started)        for the server's lifetime   │
//!                 │                          │                     │
//!                 │     any serve() returns  ▼                     │
//!                 │    ┌───────────────────────────────┐           │
//!                 │    │ cascading shutdown (detached, │           │
//!                 │    │ bounded by shutdown timeout)  │           │
//!                 │    └───────────────┬───────────────┘           │
//!                 │                    ▼                           │
//!   shutdown() ───┼─▶ status cell ──▶ fan-out: shutdown(deadline)  │
//!                 │   (started →       per server, fan-in, then    │
//!                 │    stopping)       stopping → stopped          │
//!                 │                                                │
//!                 │   first completed outcome wins (collector);    │
//!                 │   all tasks complete before the call returns   │
//!                 └───────────────────────────────────────────────┘
//! ```
//!
//! The group never supervises or restarts servers, never routes traffic, and
//! surfaces at most one error per operation.

// Core subsystems
pub mod error;
pub mod group;
pub mod server;

// Ready-made server implementations
pub mod http;

// Cross-cutting concerns
pub mod config;

pub use config::{GroupConfig, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{BoxError, GroupError};
pub use group::{GroupBuilder, ServerGroup, Status};
pub use http::HttpServer;
pub use server::{Deadline, Server};
