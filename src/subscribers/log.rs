//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [inserted] key=HEL
//! [refreshed] key=HEL
//! [refresh-failed] key=HEL err="upstream timeout"
//! [expired] key=HEL
//! [crashed] key=HEL err="recipe panicked: boom"
//! [restart-scheduled] key=HEL delay=100ms
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::EntryInserted => {
                println!("[inserted] key={:?}", e.key);
            }
            EventKind::EntryUpdated => {
                println!("[updated] key={:?}", e.key);
            }
            EventKind::RefreshSucceeded => {
                println!("[refreshed] key={:?}", e.key);
            }
            EventKind::RefreshFailed => {
                println!("[refresh-failed] key={:?} err={:?}", e.key, e.error);
            }
            EventKind::RefreshSkipped => {
                println!("[refresh-skipped] key={:?}", e.key);
            }
            EventKind::WorkerStarted => {
                println!("[worker-started] key={:?}", e.key);
            }
            EventKind::WorkerStopped => {
                println!("[worker-stopped] key={:?}", e.key);
            }
            EventKind::WorkerExpired => {
                println!("[expired] key={:?}", e.key);
            }
            EventKind::WorkerCrashed => {
                println!("[crashed] key={:?} err={:?}", e.key, e.error);
            }
            EventKind::RestartScheduled => {
                println!("[restart-scheduled] key={:?} delay={:?}", e.key, e.delay);
            }
            EventKind::WorkerRetired => {
                println!("[retired] key={:?}", e.key);
            }
            EventKind::ManagerRestarted => {
                println!("[manager-restarted] err={:?}", e.error);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
        }
    }
}
