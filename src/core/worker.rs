//! # Worker: per-key refresh loop.
//!
//! One worker owns the refresh cycle for one live key. It wakes once per
//! refresh interval, decides whether its entry went stale, recomputes the
//! entry's recipe when a new input arrived, and deletes the entry and exits
//! when the producer has been silent for a full TTL window.
//!
//! ## Cycle
//! ```text
//! init: stamp₀ ← store[key].stamp
//!       ttl_stamp = stamp₀, refresh_stamp = ∅, counter = 0
//!
//! loop {
//!   sleep(refresh_interval)                 (cancellable)
//!   elapsed = refresh_interval × max(counter, 1)
//!   (stamp, recipe) ← store[key]            (one guard)
//!
//!   elapsed ≥ ttl?
//!     ├─ yes, stamp == ttl_stamp ──► stale: delete entry, retire, exit
//!     ├─ yes, stamp ≠ ttl_stamp  ──► refresh tick, then new TTL window:
//!     │                              ttl_stamp = refresh_stamp = stamp,
//!     │                              counter = 0
//!     └─ no ─────────────────────► refresh tick, then
//!                                  refresh_stamp = stamp, counter += 1
//! }
//!
//! refresh tick:
//!   stamp == refresh_stamp ──► skip (no new input)
//!   else invoke recipe:
//!     Ok(v)  ──► store.complete(key, v)
//!     Err(_) ──► keep previous value, skip tick
//!     panic  ──► worker crashes; supervisor restarts it
//! ```
//!
//! ## Rules
//! - Folding the TTL timer into the refresh timer requires the TTL to be a
//!   multiple of the refresh interval; overruns of a few milliseconds are
//!   acceptable
//! - `max(counter, 1)` makes the first tick after a TTL reset count as one
//!   full interval, shortening the first TTL window by one tick
//! - `refresh_stamp` starts unset, so the first tick after (re)init always
//!   invokes the recipe: a freshly stored key turns Ready after one tick,
//!   and a crashed recipe is retried after restart
//! - Between two ticks only the **latest** installed recipe is observed;
//!   intermediate installs coalesce
//! - On restart after a crash, init re-reads the current stamp, so the
//!   worker rejoins the cycle with the entry's value and status intact

use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::manager::ManagerHandle;
use crate::core::supervisor::{ActorId, WorkerParams};
use crate::events::{Bus, Event, EventKind};
use crate::key::Key;
use crate::recipes::RecipeRef;
use crate::store::{Stamp, Store};

/// Reason a worker's refresh loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The producer was silent for a full TTL window; the worker deleted
    /// the entry and asked the manager to retire its supervisor.
    Expired,
    /// The entry vanished from the store; nothing left to refresh.
    Orphaned,
    /// Cooperative cancellation (shutdown or manager teardown).
    Cancelled,
}

/// Per-key refresh loop.
pub struct Worker<V> {
    key: Key,
    params: WorkerParams,
    actor: ActorId,
    store: Arc<Store<V>>,
    manager: ManagerHandle<V>,
    bus: Bus,
}

impl<V: Clone + Send + Sync + 'static> Worker<V> {
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

    /// Runs the refresh loop until expiry, orphaning, or cancellation.
    pub async fn run(&self, ctx: CancellationToken) -> WorkerExit {
        let Some(stamp) = self.store.stamp(&self.key) else {
            return WorkerExit::Orphaned;
        };
        let mut ttl_stamp: Stamp = stamp;
        let mut refresh_stamp: Option<Stamp> = None;
        let mut counter: u32 = 0;

        self.bus
            .publish(Event::now(EventKind::WorkerStarted).with_key(&self.key));

        loop {
            let sleep = time::sleep(self.params.refresh_interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = ctx.cancelled() => return WorkerExit::Cancelled,
            }

            let elapsed = self.params.refresh_interval.saturating_mul(counter.max(1));
            let Some((stamp, recipe)) = self.store.peek(&self.key) else {
                return WorkerExit::Orphaned;
            };

            if elapsed >= self.params.ttl {
                if stamp == ttl_stamp {
                    self.expire().await;
                    return WorkerExit::Expired;
                }
                // A producer spoke during the window: refresh, then open a
                // fresh TTL window.
                self.refresh(stamp, refresh_stamp, recipe).await;
                ttl_stamp = stamp;
                refresh_stamp = Some(stamp);
                counter = 0;
            } else {
                self.refresh(stamp, refresh_stamp, recipe).await;
                refresh_stamp = Some(stamp);
                counter = counter.saturating_add(1);
            }
        }
    }

    /// One refresh tick: compute iff a new recipe arrived since last tick.
    ///
    /// A panicking recipe unwinds through this future; the supervisor
    /// catches it and restarts the worker.
    async fn refresh(&self, stamp: Stamp, last_seen: Option<Stamp>, recipe: RecipeRef<V>) {
        if Some(stamp) == last_seen {
            self.bus
                .publish(Event::now(EventKind::RefreshSkipped).with_key(&self.key));
            return;
        }

        match recipe.invoke().await {
            Ok(value) => {
                self.store.complete(&self.key, value);
                self.bus
                    .publish(Event::now(EventKind::RefreshSucceeded).with_key(&self.key));
            }
            Err(e) => {
                self.bus.publish(
                    Event::now(EventKind::RefreshFailed)
                        .with_key(&self.key)
                        .with_error(e.to_string()),
                );
            }
        }
    }

    /// Deletes the stale entry and asks the manager to tear down this
    /// worker's supervisor.
    ///
    /// The teardown must go through the manager: the worker runs underneath
    /// the supervisor and cannot stop its own parent synchronously.
    async fn expire(&self) {
        self.store.remove(&self.key);
        self.bus
            .publish(Event::now(EventKind::WorkerExpired).with_key(&self.key));
        self.manager.retire(self.key.clone(), self.actor).await;
    }
}
