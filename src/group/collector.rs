//! First-result-wins reduction of concurrent outcomes.

use std::sync::OnceLock;

use crate::error::BoxError;

/// Captures the first outcome applied from a concurrent group of operations.
///
/// Only the first [`apply`](Collector::apply) has any effect; every later
/// call is a no-op, including when the first outcome was a success. Safe to
/// share across tasks.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    first: OnceLock<Option<BoxError>>,
}

impl Collector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `outcome` if nothing has been recorded yet.
    pub(crate) fn apply(&self, outcome: Result<(), BoxError>) {
        let _ = self.first.set(outcome.err());
    }

    /// The first recorded error, or `Ok` when nothing was recorded or the
    /// first outcome was a success.
    pub(crate) fn into_result(self) -> Result<(), BoxError> {
        match self.first.into_inner().flatten() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
