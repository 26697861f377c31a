//! Index construction.
//!
//! ## Module Structure
//!
//! - `walk` - Deterministic enumeration of the files under the roots
//! - `file` - Streaming a single file into its trigram set
//! - `builder` - The full pass: enumeration, indexing, progress, registration

mod builder;
mod file;
mod walk;

pub use builder::{BuildOutcome, IndexBuilder};
pub use file::index_file;
pub use walk::{canonicalize_existing_path, discover_files};
