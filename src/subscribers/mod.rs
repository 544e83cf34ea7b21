//! # Event subscribers.
//!
//! Extension point for observability: implement [`Subscribe`] and pass the
//! subscriber to [`Cache::start`](crate::Cache::start) to receive every
//! runtime [`Event`](crate::events::Event).
//!
//! The built-in [`LogWriter`] (feature `logging`) prints events to stdout
//! for development and demos.

mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
