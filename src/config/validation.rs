//! Configuration validation.
//!
//! Semantic checks only; serde handles the syntactic ones. Returns all
//! violations, not just the first.

use thiserror::Error;

use crate::config::schema::GroupConfig;

/// A single semantic violation found in a [`GroupConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A zero timeout would give the cascade no time to stop anything.
    #[error("shutdown_timeout_ms must be greater than zero")]
    ZeroShutdownTimeout,
}

/// Validate `config`, collecting every violation.
pub fn validate_config(config: &GroupConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.shutdown_timeout_ms == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
