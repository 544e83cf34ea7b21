//! # Shared entry store.
//!
//! The read side of the cache: a concurrent table mapping [`Key`](crate::Key)
//! to [`Record`], written by the manager's installation tasks and by
//! workers, read by `get` callers without ever touching the manager.

mod record;
mod table;

pub use record::{Record, Stamp, Status};
pub use table::{Installed, Store};
