//! Pattern search over an index build.

mod content;
mod engine;

pub use content::{file_contains, scan_reader};
pub use engine::{SearchEngine, SearchOutcome};
