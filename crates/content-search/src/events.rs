//! Events delivered to the caller.

use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// Everything the engine reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Percentage (0..=100) of the running pass, non-decreasing within it.
    Progress(u8),
    /// A file containing the pattern. Reported once per file.
    MatchFound(PathBuf),
    /// Terminal event of an index build; `success` is false when cancelled.
    BuildFinished { success: bool },
    /// Terminal event of a search, completed or cancelled.
    SearchFinished,
    /// A watched file changed; rebuilding is the caller's decision.
    ReindexRequested,
}

/// Receiver side of the engine's outputs.
///
/// Implementations must tolerate a caller that has stopped listening.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

impl EventSink for Sender<Event> {
    fn emit(&self, event: Event) {
        // A dropped receiver means nobody cares about the rest of the run.
        let _ = self.send(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}
