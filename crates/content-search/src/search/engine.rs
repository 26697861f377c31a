//! SearchEngine - trigram pre-filter plus confirmation scan.

use std::path::PathBuf;
use std::time::Instant;

use memchr::memmem::Finder;

use super::content::file_contains;
use crate::cancel::CancellationToken;
use crate::config::IndexConfig;
use crate::events::{Event, EventSink};
use crate::progress::ProgressReporter;
use crate::record::IndexBuild;
use crate::trigram::pattern_trigrams;

/// Result of one search pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every record was considered; matches are in discovery order.
    Completed { matches: Vec<PathBuf> },
    /// Stopped early; `matches` holds what was reported before that.
    Cancelled { matches: Vec<PathBuf> },
}

impl SearchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn matches(&self) -> &[PathBuf] {
        match self {
            Self::Completed { matches } | Self::Cancelled { matches } => matches,
        }
    }
}

/// Counters for a single search, logged when it ends.
#[derive(Debug, Default, Clone, Copy)]
struct SearchStats {
    considered: usize,
    skipped_unindexed: usize,
    rejected_by_trigrams: usize,
    confirmed_scans: usize,
}

/// Finds the records of an index build whose files contain a literal pattern.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    config: IndexConfig,
}

impl SearchEngine {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Searches `build` for `pattern`.
    ///
    /// Emits `Progress` per record, `MatchFound` once per matching file and
    /// exactly one terminal `SearchFinished`, whether completed or cancelled.
    /// The token is reset before returning.
    pub fn search(
        &self,
        build: &IndexBuild,
        pattern: &str,
        token: &CancellationToken,
        sink: &dyn EventSink,
    ) -> SearchOutcome {
        self.search_with(build, pattern, token, sink, |_| {})
    }

    /// Like [`search`](Self::search), calling `before_finish` with the
    /// outcome right before the terminal event goes out.
    pub fn search_with<F>(
        &self,
        build: &IndexBuild,
        pattern: &str,
        token: &CancellationToken,
        sink: &dyn EventSink,
        before_finish: F,
    ) -> SearchOutcome
    where
        F: FnOnce(&SearchOutcome),
    {
        let started = Instant::now();
        let mut stats = SearchStats::default();
        let mut matches = Vec::new();
        let completed = self
            .run(build, pattern.as_bytes(), token, sink, &mut matches, &mut stats)
            .is_some();

        log::info!(
            "search {} pattern_len={} records={} considered={} unindexed={} rejected={} scanned={} matches={} elapsed_ms={}",
            if completed { "complete" } else { "cancelled" },
            pattern.len(),
            build.len(),
            stats.considered,
            stats.skipped_unindexed,
            stats.rejected_by_trigrams,
            stats.confirmed_scans,
            matches.len(),
            started.elapsed().as_millis(),
        );

        let outcome = if completed {
            SearchOutcome::Completed { matches }
        } else {
            SearchOutcome::Cancelled { matches }
        };
        before_finish(&outcome);
        token.reset();
        sink.emit(Event::SearchFinished);
        outcome
    }

    fn run(
        &self,
        build: &IndexBuild,
        pattern: &[u8],
        token: &CancellationToken,
        sink: &dyn EventSink,
        matches: &mut Vec<PathBuf>,
        stats: &mut SearchStats,
    ) -> Option<()> {
        let required = pattern_trigrams(pattern);
        let finder = Finder::new(pattern);
        let mut progress = ProgressReporter::new(build.len());

        for record in build.records() {
            token.check()?;
            progress.advance_and_emit(sink);
            stats.considered += 1;

            if !record.is_indexable() {
                stats.skipped_unindexed += 1;
                continue;
            }
            if !record.contains_all(&required) {
                stats.rejected_by_trigrams += 1;
                continue;
            }

            stats.confirmed_scans += 1;
            if file_contains(record.path(), &finder, self.config.scan_chunk_size, token)? {
                let path = record.path().to_path_buf();
                sink.emit(Event::MatchFound(path.clone()));
                matches.push(path);
            }
        }

        Some(())
    }
}
