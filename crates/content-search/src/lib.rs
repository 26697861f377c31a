//! Trigram-indexed content search over a set of filesystem roots.
//!
//! This crate provides:
//! - Index construction: per-file 24-bit trigram sets built in bounded chunks
//! - Search: a trigram superset pre-filter followed by an exact literal scan
//! - Change monitoring that asks the caller to reindex when watched files change
//! - Cooperative cancellation and progress reporting for both passes
//!
//! Builds and searches report through [`Event`]s. [`SearchSession`] runs them
//! on a worker thread; [`IndexBuilder`] and [`SearchEngine`] can also be driven
//! directly on the caller's thread.

pub mod cancel;
pub mod config;
pub mod error;
pub mod events;
pub mod index;
pub mod progress;
pub mod record;
pub mod search;
pub mod session;
pub mod trigram;
pub mod watcher;

// Re-export main types
pub use cancel::CancellationToken;
pub use config::IndexConfig;
pub use error::{Result, SearchError};
pub use events::{Event, EventSink, NullSink};
pub use index::{BuildOutcome, IndexBuilder};
pub use record::{FileRecord, IndexBuild, RecordStatus};
pub use search::{SearchEngine, SearchOutcome};
pub use session::SearchSession;
pub use trigram::{Trigram, TrigramSet};
pub use watcher::{ChangeMonitor, PendingRegistration};
