//! # Cache: the supervision root and public surface.
//!
//! [`Cache`] owns the runtime components (store, event bus, manager, alive
//! tracker) and exposes the embedder-facing operations:
//!
//! - [`Cache::store`] / [`Cache::store_ttl`] publish work for a key
//! - [`Cache::get`] reads the last successfully computed value, wait-free
//! - [`Cache::shutdown`] tears every worker down within a grace period
//!
//! ## Rules
//! - `store` returns only after the recipe is visible in the store; the
//!   value materializes asynchronously on the next refresh tick
//! - `get` goes straight to the store and never touches the manager; its
//!   latency does not depend on the number of live keys
//! - the refresh interval and the store handle are fixed at start; there
//!   is no runtime reconfiguration

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::alive::AliveTracker;
use crate::core::manager::{Manager, ManagerHandle};
use crate::error::{GetError, RuntimeError, StoreError};
use crate::events::{Bus, Event, EventKind, next_event};
use crate::key::Key;
use crate::recipes::Produce;
use crate::store::{Status, Store};
use crate::subscribers::Subscribe;

/// Converts fractional seconds to whole milliseconds, truncating.
pub(crate) fn sec_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).trunc() as u64
}

/// Self-rehydrating key/value cache.
///
/// Producers push inputs with [`store`](Cache::store); one worker per live
/// key recomputes its value once per refresh interval; readers fetch the
/// latest successfully computed value with [`get`](Cache::get). A key whose
/// producer goes silent for a full TTL window is reclaimed.
///
/// ## Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cachevisor::{Cache, Config, Passthrough};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut cfg = Config::default();
///     cfg.refresh_interval = Duration::from_secs(4);
///
///     let cache: Arc<Cache<String>> = Cache::start(cfg, Arc::new(Passthrough), Vec::new())?;
///
///     cache.store_ttl("HEL", "-4°C, snow".to_string(), 12.0).await?;
///     // The first read races the first refresh tick and may see NotReady.
///     match cache.get("HEL") {
///         Ok(report) => println!("{report}"),
///         Err(e) => println!("{e}"),
///     }
///
///     cache.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct Cache<V> {
    cfg: Config,
    bus: Bus,
    store: Arc<Store<V>>,
    producer: Arc<dyn Produce<V>>,
    manager: Arc<Manager<V>>,
    handle: ManagerHandle<V>,
    alive: AliveTracker,
    root: CancellationToken,
}

impl<V: Clone + Send + Sync + 'static> Cache<V> {
    /// Builds and starts the cache runtime.
    ///
    /// Publishes the startup constants (refresh interval, store handle),
    /// spawns the subscriber and alive listeners, and starts the manager
    /// loop. Fails if `cfg.refresh_interval` is zero.
    pub fn start(
        cfg: Config,
        producer: Arc<dyn Produce<V>>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Arc<Self>, RuntimeError> {
        if cfg.refresh_interval.is_zero() {
            return Err(RuntimeError::InvalidRefreshInterval);
        }

        let bus = Bus::new(cfg.bus_capacity);
        let store = Arc::new(Store::new());
        let root = CancellationToken::new();

        // Listeners subscribe before any worker can publish.
        let alive = AliveTracker::new();
        alive.spawn_listener(bus.subscribe());
        Self::subscriber_listener(&bus, subscribers);

        let manager = Manager::new(
            cfg.refresh_interval,
            cfg.restart_backoff,
            store.clone(),
            bus.clone(),
            root.clone(),
        );
        let handle = manager.handle();
        manager.clone().run(root.child_token());

        Ok(Arc::new(Self {
            cfg,
            bus,
            store,
            producer,
            manager,
            handle,
            alive,
            root,
        }))
    }

    /// Publishes `value` for `key` with the configured default TTL.
    pub async fn store(&self, key: impl Into<Key>, value: V) -> Result<(), StoreError> {
        let ttl = self.cfg.default_ttl;
        self.install(key.into(), value, ttl).await
    }

    /// Publishes `value` for `key` with an explicit TTL in seconds.
    ///
    /// `ttl_seconds` may be fractional; it is converted to milliseconds by
    /// truncation and must be strictly greater than the refresh interval.
    pub async fn store_ttl(
        &self,
        key: impl Into<Key>,
        value: V,
        ttl_seconds: f64,
    ) -> Result<(), StoreError> {
        if !ttl_seconds.is_finite() || ttl_seconds <= 0.0 {
            return Err(StoreError::InvalidTtl);
        }
        let ttl = Duration::from_millis(sec_to_ms(ttl_seconds));
        self.install(key.into(), value, ttl).await
    }

    /// Reads the last successfully computed value for `key`.
    ///
    /// Never blocks: the worst case is a constant number of store
    /// operations regardless of live keys or worker activity.
    pub fn get(&self, key: impl Into<Key>) -> Result<V, GetError> {
        let key = key.into();
        match self.store.fetch(&key) {
            None => Err(GetError::Unavailable { key }),
            Some((Status::Ready, Some(value))) => Ok(value),
            Some(_) => Err(GetError::NotReady),
        }
    }

    /// Returns a sorted snapshot of keys that currently have a worker.
    pub async fn live_keys(&self) -> Vec<String> {
        self.alive.snapshot().await
    }

    /// Number of live entries in the store.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Subscribes to the runtime event stream.
    ///
    /// Useful for tests and advanced integrations that want to await
    /// specific lifecycle events instead of polling.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops every worker and the manager, waiting up to `Config::grace`.
    ///
    /// ### Flow
    /// - Publish `ShutdownRequested`
    /// - Cancel the root token (propagates to the manager loop and every
    ///   worker subtree)
    /// - Await all worker joins within the grace window
    /// - Report stuck keys via `RuntimeError::GraceExceeded` on overrun
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.root.cancel();

        let handles = self.manager.drain().await;
        let grace = self.cfg.grace;
        let done = async {
            for (_, join) in handles {
                let _ = join.await;
            }
        };

        match time::timeout(grace, done).await {
            Ok(_) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                let stuck = self.alive.snapshot().await;
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Validates TTL against the refresh interval, wraps the value, and
    /// round-trips through the manager.
    async fn install(&self, key: Key, value: V, ttl: Duration) -> Result<(), StoreError> {
        let refresh_ms = self.cfg.refresh_interval.as_millis() as u64;
        if ttl.as_millis() as u64 <= refresh_ms {
            return Err(StoreError::TtlTooLow { refresh_ms });
        }

        let recipe = self.producer.wrap(value);
        self.handle.install(key, recipe, ttl).await
    }

    /// Spawns the fan-out task delivering every event to each subscriber.
    fn subscriber_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) {
        if subscribers.is_empty() {
            return;
        }
        let mut rx = bus.subscribe();

        tokio::spawn(async move {
            while let Some(ev) = next_event(&mut rx).await {
                for sub in &subscribers {
                    sub.on_event(&ev).await;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sec_to_ms_truncates() {
        assert_eq!(sec_to_ms(1.0), 1000);
        assert_eq!(sec_to_ms(1.5), 1500);
        assert_eq!(sec_to_ms(0.05), 50);
        assert_eq!(sec_to_ms(0.00015), 0);
        assert_eq!(sec_to_ms(12.00), 12000);
    }
}
