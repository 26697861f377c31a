//! Per-file index records and the build that owns them.

use std::path::{Path, PathBuf};

use crate::trigram::{Trigram, TrigramSet};

/// Why a record does or does not take part in searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    /// Trigrams were collected; the record is searchable.
    #[default]
    Indexed,
    /// File exceeded the readable size ceiling.
    Oversized,
    /// Content contained a NUL unit.
    Binary,
    /// Trigram set grew past the per-file cap.
    TrigramOverflow,
    /// File could not be opened or read.
    Unreadable,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Oversized => "oversized",
            Self::Binary => "binary",
            Self::TrigramOverflow => "trigram_overflow",
            Self::Unreadable => "unreadable",
        }
    }
}

/// A file's path and the trigrams of its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    trigrams: TrigramSet,
    status: RecordStatus,
}

impl FileRecord {
    /// Creates an empty record for `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            trigrams: TrigramSet::default(),
            status: RecordStatus::Indexed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn trigrams(&self) -> &TrigramSet {
        &self.trigrams
    }

    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns true if the record takes part in searches.
    ///
    /// An indexable record may still have an empty set when the file is
    /// empty or shorter than one trigram.
    pub fn is_indexable(&self) -> bool {
        self.status == RecordStatus::Indexed
    }

    pub fn len(&self) -> usize {
        self.trigrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trigrams.is_empty()
    }

    /// Superset test used by the pre-filter; vacuously true for no trigrams.
    pub fn contains_all(&self, trigrams: &[Trigram]) -> bool {
        trigrams.iter().all(|trigram| self.trigrams.contains(trigram))
    }

    pub(crate) fn insert(&mut self, trigram: Trigram) {
        self.trigrams.insert(trigram);
    }

    /// Drops all trigrams and excludes the record for the rest of the build.
    pub(crate) fn exclude(&mut self, status: RecordStatus) {
        self.trigrams = TrigramSet::default();
        self.status = status;
    }
}

/// The immutable result of one indexing pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexBuild {
    roots: Vec<PathBuf>,
    records: Vec<FileRecord>,
}

impl IndexBuild {
    pub(crate) fn new(roots: Vec<PathBuf>, records: Vec<FileRecord>) -> Self {
        Self { roots, records }
    }

    /// Roots the build was created from, in caller order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn find(&self, path: &Path) -> Option<&FileRecord> {
        self.records.iter().find(|record| record.path() == path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that take part in searches.
    pub fn indexable_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_indexable()).count()
    }
}
