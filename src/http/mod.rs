//! Ready-made HTTP server member for a group.
//!
//! # Responsibilities
//! - Wrap an axum `Router` in the [`Server`](crate::Server) contract
//! - Translate a group stop request into axum's graceful shutdown
//! - Honor the stop deadline handed down by the group

pub mod server;

pub use server::HttpServer;
