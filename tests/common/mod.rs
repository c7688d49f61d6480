//! Shared test doubles for group lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use server_group::{BoxError, Deadline, Server};

/// Route test logs through tracing when RUST_LOG is set.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Scripted group member: optionally delays, then either fails with a fixed
/// message or blocks until its stop operation is invoked.
#[allow(dead_code)]
pub struct ScriptedServer {
    name: &'static str,
    delay: Duration,
    fail_with: Option<&'static str>,
    stop_result: Result<(), &'static str>,
    stop: Notify,
    serve_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedServer {
    fn new(
        name: &'static str,
        delay: Duration,
        fail_with: Option<&'static str>,
        stop_result: Result<(), &'static str>,
    ) -> Self {
        Self {
            name,
            delay,
            fail_with,
            stop_result,
            stop: Notify::new(),
            serve_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// Serves until stopped, then returns cleanly.
    pub fn blocking(name: &'static str) -> Self {
        Self::new(name, Duration::ZERO, None, Ok(()))
    }

    /// Serves until stopped, then returns the given error (the way a real
    /// listener reports "server closed").
    pub fn closing_with(name: &'static str, msg: &'static str) -> Self {
        Self::new(name, Duration::ZERO, None, Err(msg))
    }

    /// Fails immediately with the given error.
    pub fn failing(name: &'static str, msg: &'static str) -> Self {
        Self::new(name, Duration::ZERO, Some(msg), Ok(()))
    }

    /// Fails with the given error after `delay`.
    pub fn failing_after(name: &'static str, delay: Duration, msg: &'static str) -> Self {
        Self::new(name, delay, Some(msg), Ok(()))
    }

    pub fn serve_calls(&self) -> usize {
        self.serve_calls.load(Ordering::SeqCst)
    }

    pub fn stop_invoked(&self) -> bool {
        self.stop_calls.load(Ordering::SeqCst) > 0
    }
}

#[async_trait]
impl Server for ScriptedServer {
    fn name(&self) -> &str {
        self.name
    }

    async fn serve(&self) -> Result<(), BoxError> {
        self.serve_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(msg) = self.fail_with {
            return Err(msg.into());
        }
        self.stop.notified().await;
        self.stop_result.map_err(Into::into)
    }

    async fn shutdown(&self, _deadline: Deadline) -> Result<(), BoxError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stop.notify_one();
        Ok(())
    }
}
