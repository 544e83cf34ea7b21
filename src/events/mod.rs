//! # Runtime events: bus and event types.
//!
//! Everything the runtime does (installing recipes, refreshing entries,
//! expiring and restarting workers, shutting down) is published as an
//! [`Event`] on the [`Bus`]. Subscribers (see [`crate::subscribers`])
//! consume the stream for logging, metrics, or test synchronization.
//!
//! ## Overflow
//! The bus is a bounded broadcast channel. A listener that falls more than
//! `Config::bus_capacity` events behind is lagged: the channel drops its
//! oldest pending events and keeps the newest. Cache listeners tolerate
//! this with [`next_event`], which skips the gap and resumes with what is
//! current; most of the stream is periodic per-tick state that the next
//! tick republishes anyway, so a skipped gap self-heals.

mod event;

pub use event::{Event, EventKind};

use tokio::sync::broadcast;

/// Broadcast channel carrying the runtime's [`Event`] stream.
///
/// Cloned into the manager and every worker subtree; each clone publishes
/// into the same bounded channel.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus able to buffer `capacity` events per listener.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event without blocking.
    ///
    /// With no listeners attached the event is dropped; publishing is
    /// observability, never control flow.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Attaches a new listener starting at the current end of the stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

/// Receives the next event, skipping over any gap left by bus overflow.
///
/// Returns `None` once the bus is closed (every [`Bus`] clone dropped),
/// which is the listener's signal to exit.
pub(crate) async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Option<Event> {
    loop {
        match rx.recv().await {
            Ok(ev) => return Some(ev),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_event_skips_a_lagged_gap() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();

        // Overflow the two-slot buffer; the oldest events are dropped.
        for _ in 0..5 {
            bus.publish(Event::now(EventKind::RefreshSkipped));
        }
        bus.publish(Event::now(EventKind::WorkerExpired));

        // The listener resumes with what is still buffered instead of
        // erroring out, and the newest event is reachable.
        let mut kinds = Vec::new();
        while let Some(ev) = next_event(&mut rx).await {
            kinds.push(ev.kind);
            if ev.kind == EventKind::WorkerExpired {
                break;
            }
        }
        assert_eq!(kinds.last(), Some(&EventKind::WorkerExpired));
    }

    #[tokio::test]
    async fn next_event_ends_when_the_bus_closes() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::ShutdownRequested));
        drop(bus);

        assert!(matches!(
            next_event(&mut rx).await,
            Some(Event {
                kind: EventKind::ShutdownRequested,
                ..
            })
        ));
        assert!(next_event(&mut rx).await.is_none());
    }
}
