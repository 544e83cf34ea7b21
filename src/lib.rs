//! # cachevisor
//!
//! **Cachevisor** is an in-process, self-rehydrating key/value cache.
//!
//! Producers continuously push fresh inputs for a known set of keys; turning
//! an input into its served value is expensive, so the work is amortized
//! out-of-band of reads: one supervised worker per live key recomputes the
//! value on a shared refresh cadence, and readers always get the most
//! recently successfully computed value, wait-free.
//!
//! ## Features
//!
//! | Area            | Description                                                        | Key types / traits                  |
//! |-----------------|--------------------------------------------------------------------|-------------------------------------|
//! | **Cache**       | Store inputs, read computed values, graceful shutdown.             | [`Cache`]                           |
//! | **Recipes**     | Deferred computations installed per store, run per refresh tick.   | [`Recipe`], [`RecipeFn`], [`RecipeRef`] |
//! | **Producers**   | Adapters turning caller values into recipes (snapshot semantics).  | [`Produce`], [`Passthrough`], [`Simulated`] |
//! | **Supervision** | Per-key crash isolation with paced transient restarts.             | [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Events**      | Lifecycle event stream for logging, metrics, tests.                | [`Event`], [`EventKind`], [`Subscribe`] |
//! | **Errors**      | Typed errors for stores, reads, recipes, and the runtime.          | [`StoreError`], [`GetError`], [`RecipeError`], [`RuntimeError`] |
//! | **Configuration** | Centralized runtime settings.                                    | [`Config`]                          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cachevisor::{Cache, Config, Passthrough};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.refresh_interval = Duration::from_secs(4);
//!
//!     let cache: Arc<Cache<u64>> = Cache::start(cfg, Arc::new(Passthrough), Vec::new())?;
//!
//!     // Publish work; the value materializes on the next refresh tick.
//!     cache.store_ttl("sensor-7", 42, 12.0).await?;
//!
//!     // Reads never block; poll if you need to wait for readiness.
//!     match cache.get("sensor-7") {
//!         Ok(v) => println!("sensor-7 = {v}"),
//!         Err(e) => println!("sensor-7: {e}"),
//!     }
//!
//!     cache.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod config;
mod core;
mod error;
mod events;
mod key;
mod policies;
mod recipes;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::Cache;
pub use config::Config;
pub use error::{GetError, RecipeError, RuntimeError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use key::Key;
pub use policies::{BackoffPolicy, JitterPolicy};
pub use recipes::{BoxRecipeFuture, Passthrough, Produce, Recipe, RecipeFn, RecipeRef, Simulated};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logging subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
