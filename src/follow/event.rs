// SPDX-License-Identifier: Apache-2.0

//! Events emitted to the consumer of a follower.

use std::path::PathBuf;
use std::sync::Arc;

use crate::bounded_channel::BoundedSender;

/// Observable events, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowEvent<E> {
    /// The loop could not continue; carries the offending path
    ErrorOccurred { path: PathBuf, message: String },
    /// A new path was configured
    PathChanged(PathBuf),
    /// The pause flag actually changed
    PausedChanged(bool),
    /// The file size observed at cycle start differs from the previous one
    FileSizeChanged(u64),
    /// One parsed record, in file order
    NewEntry(E),
    /// A read cycle completed; carries the offset reached
    CycleEndReached(u64),
}

impl<E> FollowEvent<E> {
    /// Short name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            FollowEvent::ErrorOccurred { .. } => "error_occurred",
            FollowEvent::PathChanged(_) => "path_changed",
            FollowEvent::PausedChanged(_) => "paused_changed",
            FollowEvent::FileSizeChanged(_) => "file_size_changed",
            FollowEvent::NewEntry(_) => "new_entry",
            FollowEvent::CycleEndReached(_) => "cycle_end_reached",
        }
    }

    pub fn into_entry(self) -> Option<E> {
        match self {
            FollowEvent::NewEntry(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Receives follower events. Called without any follower lock held, so an
/// implementation may call back into the follower.
pub trait EventSink<E>: Send + Sync {
    fn emit(&self, event: FollowEvent<E>);
}

/// Shared handle to an event sink.
pub type SharedEventSink<E> = Arc<dyn EventSink<E>>;

impl<E, F> EventSink<E> for F
where
    F: Fn(FollowEvent<E>) + Send + Sync,
{
    fn emit(&self, event: FollowEvent<E>) {
        self(event)
    }
}

/// Events are delivered with a blocking send, so a full channel applies
/// backpressure to the tail loop. A disconnected receiver drops the event.
impl<E: Send> EventSink<E> for BoundedSender<FollowEvent<E>> {
    fn emit(&self, event: FollowEvent<E>) {
        let kind = event.kind();
        if self.send_blocking(event).is_err() {
            tracing::debug!(event = kind, "Event receiver closed, dropping event");
        }
    }
}
