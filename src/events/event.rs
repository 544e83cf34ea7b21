//! # Runtime events emitted by workers, the manager, and the root cache.
//!
//! The [`EventKind`] enum classifies events across four categories:
//! - **Store plane**: recipe installation outcomes (inserted, updated)
//! - **Refresh cycle**: per-tick outcomes (succeeded, failed, skipped)
//! - **Worker lifecycle**: start, stop, expiry, crash, restart, retirement
//! - **Control plane**: manager restarts and shutdown progress
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered even when delivered out of order
//! through async channels. The wall-clock `at` timestamp is for logging
//! only.
//!
//! ## Event flow examples
//!
//! ### First store for a key
//! ```text
//! store(key) → EntryInserted → WorkerStarted
//!            → (tick) RefreshSucceeded
//! ```
//!
//! ### Producer goes silent
//! ```text
//! (ticks) RefreshSkipped … → WorkerExpired → WorkerRetired
//! ```
//!
//! ### Recipe panics
//! ```text
//! WorkerCrashed → RestartScheduled → WorkerStarted
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Store plane ===
    /// A recipe was installed for a previously unknown key.
    EntryInserted,
    /// A recipe was installed in place for a known key.
    EntryUpdated,

    // === Refresh cycle ===
    /// A refresh tick invoked the recipe and stored its value.
    RefreshSucceeded,
    /// A refresh tick invoked the recipe and it failed recoverably;
    /// the previous value is preserved.
    RefreshFailed,
    /// A refresh tick found no new input and did nothing.
    RefreshSkipped,

    // === Worker lifecycle ===
    /// A worker began its refresh loop for a key.
    WorkerStarted,
    /// A worker stopped cooperatively (cancellation or orphaned entry).
    WorkerStopped,
    /// A worker found its entry stale for a full TTL window, deleted it,
    /// and exited.
    WorkerExpired,
    /// A worker crashed (its recipe panicked); a restart follows.
    WorkerCrashed,
    /// A crashed worker's restart was scheduled after a backoff delay.
    RestartScheduled,
    /// The manager tore down an expired worker's supervisor.
    WorkerRetired,

    // === Control plane ===
    /// The manager loop crashed and was restarted; in-flight callers were
    /// dropped.
    ManagerRestarted,
    /// Shutdown was requested.
    ShutdownRequested,
    /// All workers stopped within the configured grace period.
    AllStoppedWithin,
    /// Grace period exceeded; some workers did not stop in time.
    GraceExceeded,
}

/// Runtime event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// Backoff delay before a restart (if relevant).
    pub delay: Option<Duration>,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
    /// Rendered key of the entry, if applicable.
    pub key: Option<String>,
    /// The kind of event.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            delay: None,
            error: None,
            key: None,
        }
    }

    /// Attaches a rendered key.
    pub fn with_key(mut self, key: impl ToString) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a restart delay.
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }
}
