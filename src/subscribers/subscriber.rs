//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] — the extension point for plugging custom event
//! handlers into the runtime.
//!
//! Subscribers are driven by a single forwarding task spawned by the root
//! cache: it receives every event from the bus and calls each subscriber in
//! turn.
//!
//! ## Rules
//! - `on_event()` runs in the forwarding task, not in the publisher context
//! - Events are delivered in `seq` order to each subscriber
//! - A slow subscriber delays the others; keep handlers short and use async
//!   I/O for anything expensive
//! - If the forwarding task lags behind the bus capacity, old events are
//!   skipped for all subscribers
//!
//! ## Example
//! ```rust,ignore
//! use async_trait::async_trait;
//! use cachevisor::{Event, EventKind, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RefreshFailed {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// Receives every runtime event via the root cache's forwarding task.
/// Handlers should not panic; handle errors internally.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns subscriber name for diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
