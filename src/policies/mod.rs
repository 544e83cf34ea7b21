//! # Restart pacing policies.
//!
//! A worker whose recipe panics is restarted by its supervisor. These
//! policies control how long the supervisor waits before each restart:
//!
//! - [`BackoffPolicy`] — growth and cap of the delay across consecutive
//!   crashes.
//! - [`JitterPolicy`] — randomization of the delay so that many keys
//!   crashing together do not restart in lockstep.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
