//! # Tracks currently live keys.
//!
//! [`AliveTracker`] subscribes to runtime events and maintains the set of
//! keys that currently have a worker. It listens for
//! [`EventKind::WorkerStarted`] and the terminal worker events to update
//! its state.
//!
//! The root cache uses the snapshot two ways: as the public
//! [`live_keys`](crate::Cache::live_keys) view, and to report which keys
//! were stuck when a shutdown overruns its grace period.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::events::{Event, EventKind, next_event};

/// Tracks which keys currently have a live worker.
#[derive(Clone)]
pub struct AliveTracker {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl AliveTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Spawns a background listener that subscribes to the given event
    /// stream.
    ///
    /// A crashed worker stays in the set: its supervisor restarts it and
    /// republishes `WorkerStarted`.
    pub fn spawn_listener(&self, mut rx: tokio::sync::broadcast::Receiver<Event>) {
        let inner = self.inner.clone();

        tokio::spawn(async move {
            while let Some(ev) = next_event(&mut rx).await {
                match ev.kind {
                    EventKind::WorkerStarted => {
                        if let Some(key) = ev.key.clone() {
                            inner.lock().await.insert(key);
                        }
                    }
                    EventKind::WorkerStopped | EventKind::WorkerExpired => {
                        if let Some(key) = ev.key.clone() {
                            inner.lock().await.remove(&key);
                        }
                    }
                    _ => {}
                }
            }
        });
    }

    /// Returns a sorted snapshot of currently live keys.
    pub async fn snapshot(&self) -> Vec<String> {
        let guard = self.inner.lock().await;
        let mut keys: Vec<String> = guard.iter().cloned().collect();
        keys.sort_unstable();
        keys
    }
}
