//! # Error types used by the cache runtime, producers, and readers.
//!
//! This module defines four error types:
//!
//! - [`StoreError`] errors surfaced to `store` callers (validation and
//!   recipe installation).
//! - [`GetError`] errors surfaced to `get` callers (entry busy or absent).
//! - [`RecipeError`] recoverable failure returned by a recipe invocation.
//! - [`RuntimeError`] errors raised by the runtime itself (startup
//!   validation, shutdown).
//!
//! All enums provide `as_label` helpers for logs/metrics.

use std::time::Duration;

use thiserror::Error;

use crate::key::Key;

/// # Errors returned to `store` callers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// TTL was not a positive, finite number of seconds.
    #[error("TTL must be a positive number of seconds")]
    InvalidTtl,

    /// TTL converted to milliseconds does not exceed the refresh interval.
    ///
    /// A worker wakes once per refresh interval; a TTL at or below it would
    /// expire the entry before the worker could ever observe a refresh.
    #[error("TTL too low. Should be greater than refresh_interval: {refresh_ms}ms")]
    TtlTooLow {
        /// The configured refresh interval, in milliseconds.
        refresh_ms: u64,
    },

    /// The asynchronous installation task crashed before the recipe became
    /// visible in the store.
    #[error("recipe installation failed: {reason}")]
    Install {
        /// Panic payload of the installation task.
        reason: String,
    },

    /// The cache is shutting down (or the manager dropped the request);
    /// the caller should retry against a live cache.
    #[error("cache is not accepting requests")]
    Closed,
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::InvalidTtl => "store_invalid_ttl",
            StoreError::TtlTooLow { .. } => "store_ttl_too_low",
            StoreError::Install { .. } => "store_install_failed",
            StoreError::Closed => "store_closed",
        }
    }
}

/// # Errors returned to `get` callers.
///
/// `get` never blocks; both variants describe the entry's current state.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum GetError {
    /// The entry is live but no recipe has completed successfully yet.
    #[error("data is not ready")]
    NotReady,

    /// No live entry exists for the key: it was never stored, or its
    /// producer went silent for a full TTL window and it was reclaimed.
    #[error("data with the given key {key} is not yet available")]
    Unavailable {
        /// The key that was looked up.
        key: Key,
    },
}

impl GetError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            GetError::NotReady => "get_not_ready",
            GetError::Unavailable { .. } => "get_unavailable",
        }
    }
}

/// # Recoverable failure returned by a recipe invocation.
///
/// A worker that receives this skips the tick and preserves the entry's
/// previous value and status. A recipe that cannot even fail cleanly may
/// panic instead; that crashes the worker and triggers a supervised
/// restart.
#[derive(Error, Debug, Clone)]
#[error("recipe failed: {reason}")]
pub struct RecipeError {
    /// Human-readable failure reason.
    pub reason: String,
}

impl RecipeError {
    /// Creates a new recoverable recipe failure.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// # Errors produced by the cache runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `Config::refresh_interval` was zero.
    #[error("refresh_interval must be positive")]
    InvalidRefreshInterval,

    /// Shutdown grace period was exceeded; some workers remained stuck.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Keys whose workers did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidRefreshInterval => "runtime_invalid_refresh_interval",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_too_low_message_names_the_interval() {
        let err = StoreError::TtlTooLow { refresh_ms: 4000 };
        assert_eq!(
            err.to_string(),
            "TTL too low. Should be greater than refresh_interval: 4000ms"
        );
    }

    #[test]
    fn unavailable_message_names_the_key() {
        let err = GetError::Unavailable {
            key: Key::from("HEL"),
        };
        assert_eq!(
            err.to_string(),
            "data with the given key HEL is not yet available"
        );
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(StoreError::Closed.as_label(), "store_closed");
        assert_eq!(GetError::NotReady.as_label(), "get_not_ready");
        assert_eq!(
            RuntimeError::InvalidRefreshInterval.as_label(),
            "runtime_invalid_refresh_interval"
        );
    }
}
