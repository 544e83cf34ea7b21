//! # Manager: serialized coordinator for stores and worker lifecycle.
//!
//! The manager is the single writer of the worker registry. It serializes
//! inbound requests over an `mpsc` channel and guarantees exactly one
//! worker per live key:
//!
//! - `Install` — a `store` call. The atomic upsert runs in a short-lived
//!   spawned task so the manager never blocks on recipe installation; the
//!   task reports the outcome back through the manager's own channel.
//! - `Installed` — an upsert outcome. The caller is acknowledged, and a
//!   first-seen key gets a [`WorkerSupervisor`] spawned and registered.
//! - `Retire` — sent asynchronously by a worker that expired its entry. The
//!   registry entry is torn down only if its [`ActorId`] still matches;
//!   a stale retire (the key was re-stored and a newer worker owns it)
//!   is ignored.
//!
//! ## Rules
//! - Caller reply channels travel inside request messages; the manager
//!   struct holds no per-request state
//! - The registry outlives the request loop: a loop crash is restarted by
//!   `run` without dropping live workers, and in-flight callers observe
//!   dropped reply channels (`StoreError::Closed`) and must retry
//! - Worker teardown always happens out of band (cancel, then a spawned
//!   join), because a worker cannot stop its own supervisor synchronously

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::supervisor::{
    ActorId, WorkerParams, WorkerSupervisor, next_actor_id, panic_reason,
};
use crate::error::StoreError;
use crate::events::{Bus, Event, EventKind};
use crate::key::Key;
use crate::policies::BackoffPolicy;
use crate::recipes::RecipeRef;
use crate::store::{Installed, Store};

/// Capacity of the manager's request channel.
const REQUEST_QUEUE_CAPACITY: usize = 512;

/// Requests handled by the manager loop.
enum Request<V> {
    /// A `store` call: install `recipe` for `key`.
    Install {
        key: Key,
        recipe: RecipeRef<V>,
        ttl: Duration,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    /// Report from an installation task.
    Installed {
        key: Key,
        ttl: Duration,
        outcome: Installed,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    /// An expiring worker asks for its supervisor to be torn down.
    Retire { key: Key, actor: ActorId },
}

/// Handle for submitting requests to the manager.
pub struct ManagerHandle<V> {
    tx: mpsc::Sender<Request<V>>,
}

impl<V> Clone for ManagerHandle<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<V> ManagerHandle<V> {
    /// Installs a recipe and waits for it to become visible in the store.
    ///
    /// Returns once the upsert completed; value materialization stays
    /// asynchronous.
    pub async fn install(
        &self,
        key: Key,
        recipe: RecipeRef<V>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Install {
                key,
                recipe,
                ttl,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)?
    }

    /// Asks the manager to tear down the supervisor identified by `actor`.
    ///
    /// Fire-and-forget; a send failure only means the runtime is already
    /// shutting down.
    pub async fn retire(&self, key: Key, actor: ActorId) {
        let _ = self.tx.send(Request::Retire { key, actor }).await;
    }
}

/// Handle to one running worker subtree.
struct WorkerHandle {
    actor: ActorId,
    join: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Serialized coordinator owning the worker registry.
pub struct Manager<V> {
    refresh_interval: Duration,
    backoff: BackoffPolicy,
    store: Arc<Store<V>>,
    bus: Bus,

    /// key → live worker subtree. Shared with nothing but this manager,
    /// but kept outside the request loop so a loop restart preserves it.
    registry: RwLock<HashMap<Key, WorkerHandle>>,

    /// Parent token for every worker subtree.
    root: CancellationToken,

    tx: mpsc::Sender<Request<V>>,
    rx: RwLock<Option<mpsc::Receiver<Request<V>>>>,
}

impl<V: Clone + Send + Sync + 'static> Manager<V> {
    /// Creates a new manager (must call [`Manager::run`] to start).
    pub fn new(
        refresh_interval: Duration,
        backoff: BackoffPolicy,
        store: Arc<Store<V>>,
        bus: Bus,
        root: CancellationToken,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_CAPACITY);

        Arc::new(Self {
            refresh_interval,
            backoff,
            store,
            bus,
            registry: RwLock::new(HashMap::new()),
            root,
            tx,
            rx: RwLock::new(Some(rx)),
        })
    }

    /// Returns a handle for submitting requests.
    pub fn handle(&self) -> ManagerHandle<V> {
        ManagerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Starts the manager loop (spawns in background).
    pub fn run(self: Arc<Self>, token: CancellationToken) {
        tokio::spawn(async move {
            if let Err(e) = self.run_supervised(token).await {
                eprintln!("[manager] error: {e:?}");
            }
        });
    }

    /// Runs the request loop, restarting it after a panic.
    ///
    /// One-for-one supervision of the control plane: the registry and
    /// channel live outside the loop, so live workers survive a restart.
    async fn run_supervised(&self, token: CancellationToken) -> anyhow::Result<()> {
        let mut rx = self
            .rx
            .write()
            .await
            .take()
            .ok_or_else(|| anyhow::anyhow!("manager already running"))?;

        loop {
            let attempt = std::panic::AssertUnwindSafe(self.run_inner(&mut rx, &token))
                .catch_unwind()
                .await;
            match attempt {
                Ok(()) => return Ok(()),
                Err(panic) => {
                    self.bus.publish(
                        Event::now(EventKind::ManagerRestarted)
                            .with_error(panic_reason(panic.as_ref())),
                    );
                }
            }
        }
    }

    async fn run_inner(&self, rx: &mut mpsc::Receiver<Request<V>>, token: &CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(Request::Install { key, recipe, ttl, reply }) => {
                        self.handle_install(key, recipe, ttl, reply);
                    }
                    Some(Request::Installed { key, ttl, outcome, reply }) => {
                        self.handle_installed(key, ttl, outcome, reply).await;
                    }
                    Some(Request::Retire { key, actor }) => {
                        self.handle_retire(key, actor).await;
                    }
                    None => break,
                }
            }
        }
    }

    /// Off-loads the store upsert to a short-lived task.
    ///
    /// The task reports back via the manager channel; if it panics, the
    /// caller gets the panic reason instead of an acknowledgement.
    fn handle_install(
        &self,
        key: Key,
        recipe: RecipeRef<V>,
        ttl: Duration,
        reply: oneshot::Sender<Result<(), StoreError>>,
    ) {
        let store = self.store.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let installed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                store.install(key.clone(), recipe)
            }));
            let outcome = match installed {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let _ = reply.send(Err(StoreError::Install {
                        reason: panic_reason(panic.as_ref()),
                    }));
                    return;
                }
            };

            if let Err(unsent) = tx
                .send(Request::Installed {
                    key,
                    ttl,
                    outcome,
                    reply,
                })
                .await
            {
                if let Request::Installed { reply, .. } = unsent.0 {
                    let _ = reply.send(Err(StoreError::Closed));
                }
            }
        });
    }

    /// Acknowledges the caller and spawns a worker for first-seen keys.
    async fn handle_installed(
        &self,
        key: Key,
        ttl: Duration,
        outcome: Installed,
        reply: oneshot::Sender<Result<(), StoreError>>,
    ) {
        let _ = reply.send(Ok(()));

        match outcome {
            Installed::Updated => {
                self.bus
                    .publish(Event::now(EventKind::EntryUpdated).with_key(&key));
            }
            Installed::Inserted => {
                self.bus
                    .publish(Event::now(EventKind::EntryInserted).with_key(&key));
                self.spawn_worker(key, ttl).await;
            }
        }
    }

    /// Spawns and registers a supervisor subtree for `key`.
    async fn spawn_worker(&self, key: Key, ttl: Duration) {
        let mut registry = self.registry.write().await;

        if let Some(old) = registry.remove(&key) {
            // An insert with a registered worker means that worker is in
            // its dying moments: it deleted its record and the fresh
            // install re-created the entry before the retire arrived.
            old.cancel.cancel();
            tokio::spawn(async move {
                let _ = old.join.await;
            });
        }

        let actor = next_actor_id();
        let cancel = self.root.child_token();
        let supervisor = WorkerSupervisor::new(
            key.clone(),
            WorkerParams {
                ttl,
                refresh_interval: self.refresh_interval,
                backoff: self.backoff,
            },
            actor,
            self.store.clone(),
            self.handle(),
            self.bus.clone(),
        );
        let join = tokio::spawn(supervisor.run(cancel.clone()));

        registry.insert(
            key,
            WorkerHandle {
                actor,
                join,
                cancel,
            },
        );
    }

    /// Tears down the retiring worker's subtree: cancel → join → report.
    async fn handle_retire(&self, key: Key, actor: ActorId) {
        let mut registry = self.registry.write().await;
        let handle = match registry.remove(&key) {
            Some(h) if h.actor == actor => h,
            Some(h) => {
                // A newer worker owns the key now; put it back.
                registry.insert(key, h);
                return;
            }
            None => return,
        };
        drop(registry);

        handle.cancel.cancel();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let _ = handle.join.await;
            bus.publish(Event::now(EventKind::WorkerRetired).with_key(&key));
        });
    }

    /// Cancels every worker subtree and hands back their join handles.
    ///
    /// Used by shutdown; the registry is left empty.
    pub async fn drain(&self) -> Vec<(String, JoinHandle<()>)> {
        let mut registry = self.registry.write().await;
        registry
            .drain()
            .map(|(key, handle)| {
                handle.cancel.cancel();
                (key.to_string(), handle.join)
            })
            .collect()
    }
}
