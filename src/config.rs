//! # Global runtime configuration.
//!
//! [`Config`] defines the cache runtime's behavior: the refresh cadence
//! shared by every worker, the default entry TTL, shutdown grace period,
//! event bus capacity, and the pacing of crash restarts.
//!
//! The refresh interval and the store handle are published once when
//! [`Cache::start`](crate::Cache::start) builds the runtime and are
//! read-only afterwards; there is no runtime reconfiguration.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use cachevisor::{BackoffPolicy, Config};
//!
//! let mut cfg = Config::default();
//! cfg.refresh_interval = Duration::from_secs(2);
//! cfg.default_ttl = Duration::from_secs(600);
//! cfg.grace = Duration::from_secs(5);
//! cfg.restart_backoff = BackoffPolicy::default();
//!
//! assert_eq!(cfg.refresh_interval, Duration::from_secs(2));
//! ```

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Global configuration for the cache runtime.
///
/// Controls worker wake cadence, default TTL, event bus sizing, shutdown
/// grace, and crash-restart pacing.
#[derive(Clone, Debug)]
pub struct Config {
    /// Cadence at which every worker wakes to potentially recompute its key.
    ///
    /// Must be positive; validated by [`Cache::start`](crate::Cache::start).
    /// Entry TTLs must be strictly greater than this interval.
    pub refresh_interval: Duration,
    /// TTL applied by [`Cache::store`](crate::Cache::store) when the caller
    /// does not pass one explicitly.
    pub default_ttl: Duration,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Maximum time to wait for workers to stop during shutdown.
    pub grace: Duration,
    /// Delay policy applied between worker crash restarts.
    pub restart_backoff: BackoffPolicy,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `refresh_interval = 4s`
    /// - `default_ttl = 3600s`
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    /// - `restart_backoff = BackoffPolicy::default()`
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(4),
            default_ttl: Duration::from_secs(3600),
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
            restart_backoff: BackoffPolicy::default(),
        }
    }
}
