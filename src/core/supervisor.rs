//! # WorkerSupervisor: transient one-for-one restart wrapper.
//!
//! Supervises exactly one [`Worker`]:
//! - a clean exit (expired, orphaned, cancelled) ends the subtree,
//! - a panic (the recipe raised) publishes a crash event, waits per the
//!   configured backoff, and restarts the worker.
//!
//! On restart the worker re-reads its stamps from the store, so the entry's
//! last value and status survive the crash untouched.
//!
//! The manager addresses the supervisor, not the worker: its [`ActorId`]
//! stays stable across restarts, so an expiring worker can name its own
//! subtree in a retire request even though the worker future's identity
//! changes every restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use futures::FutureExt;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::manager::ManagerHandle;
use crate::core::worker::{Worker, WorkerExit};
use crate::events::{Bus, Event, EventKind};
use crate::key::Key;
use crate::policies::BackoffPolicy;
use crate::store::Store;

/// Process-unique identity of one worker supervisor.
pub type ActorId = u64;

static ACTOR_SEQ: AtomicU64 = AtomicU64::new(1);

/// Draws the next supervisor identity.
pub fn next_actor_id() -> ActorId {
    ACTOR_SEQ.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Configuration parameters for one worker subtree.
#[derive(Clone, Copy)]
pub struct WorkerParams {
    /// TTL window for the supervised key.
    pub ttl: Duration,
    /// Global refresh cadence.
    pub refresh_interval: Duration,
    /// Delay policy between crash restarts.
    pub backoff: BackoffPolicy,
}

/// Transient supervisor for one key's worker.
pub struct WorkerSupervisor<V> {
    key: Key,
    params: WorkerParams,
    actor: ActorId,
    store: Arc<Store<V>>,
    manager: ManagerHandle<V>,
    bus: Bus,
}

impl<V: Clone + Send + Sync + 'static> WorkerSupervisor<V> {
    pub fn new(
        key: Key,
        params: WorkerParams,
        actor: ActorId,
        store: Arc<Store<V>>,
        manager: ManagerHandle<V>,
        bus: Bus,
    ) -> Self {
        Self {
            key,
            params,
            actor,
            store,
            manager,
            bus,
        }
    }

    /// Runs the worker, restarting it after panics until it exits cleanly.
    pub async fn run(self, token: CancellationToken) {
        let mut prev_delay: Option<Duration> = None;

        loop {
            let worker = Worker::new(
                self.key.clone(),
                self.params,
                self.actor,
                self.store.clone(),
                self.manager.clone(),
                self.bus.clone(),
            );

            let attempt = std::panic::AssertUnwindSafe(worker.run(token.clone()))
                .catch_unwind()
                .await;

            match attempt {
                Ok(WorkerExit::Expired) => {
                    // Expiry already published by the worker; transient
                    // policy means no restart on a normal exit.
                    return;
                }
                Ok(WorkerExit::Orphaned) | Ok(WorkerExit::Cancelled) => {
                    self.bus
                        .publish(Event::now(EventKind::WorkerStopped).with_key(&self.key));
                    return;
                }
                Err(panic) => {
                    self.bus.publish(
                        Event::now(EventKind::WorkerCrashed)
                            .with_key(&self.key)
                            .with_error(panic_reason(panic.as_ref())),
                    );

                    let delay = self.params.backoff.next(prev_delay);
                    prev_delay = Some(delay);
                    self.bus.publish(
                        Event::now(EventKind::RestartScheduled)
                            .with_key(&self.key)
                            .with_delay(delay),
                    );

                    let sleep = time::sleep(delay);
                    tokio::pin!(sleep);
                    select! {
                        _ = &mut sleep => {}
                        _ = token.cancelled() => {
                            self.bus.publish(
                                Event::now(EventKind::WorkerStopped).with_key(&self.key),
                            );
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Renders a panic payload into a loggable reason.
pub(crate) fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
