//! # Runtime core: cache root, manager, workers, supervision.
//!
//! ```text
//! Cache::store(key, value, ttl)
//!        │
//!        ▼
//!    Manager ──► install task ──► Store (atomic upsert)
//!        │
//!        ├──► first-seen key: spawn WorkerSupervisor ──► Worker
//!        │                                                 │
//!        │                 tick: invoke recipe, write value┘
//!        │
//!        ◄──── Retire (expired worker) ──► cancel + join supervisor
//!
//! Cache::get(key) ──► Store (no manager round-trip)
//! ```

mod alive;
mod cache;
mod manager;
mod supervisor;
mod worker;

pub use cache::Cache;
