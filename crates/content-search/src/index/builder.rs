//! IndexBuilder - turns a list of roots into an [`IndexBuild`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;

use super::file::index_file;
use super::walk::{canonicalize_existing_path, discover_files};
use crate::cancel::CancellationToken;
use crate::config::IndexConfig;
use crate::events::{Event, EventSink};
use crate::progress::ProgressReporter;
use crate::record::{FileRecord, IndexBuild, RecordStatus};
use crate::watcher::{ChangeMonitor, PendingRegistration};

/// Result of one indexing pass.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Completed(Arc<IndexBuild>),
    Cancelled,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn build(&self) -> Option<&Arc<IndexBuild>> {
        match self {
            Self::Completed(build) => Some(build),
            Self::Cancelled => None,
        }
    }
}

/// Builds trigram indexes for a set of roots.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Indexes every regular file under `roots`.
    ///
    /// Emits `Progress` after each file and exactly one terminal
    /// `BuildFinished`. On success the monitor's watched set is replaced with
    /// the new build's files; on cancellation the partial build and its
    /// registrations are dropped. The token is reset before returning.
    pub fn build(
        &self,
        roots: &[PathBuf],
        monitor: &ChangeMonitor,
        token: &CancellationToken,
        sink: &dyn EventSink,
    ) -> BuildOutcome {
        self.build_with(roots, monitor, token, sink, |_| {})
    }

    /// Like [`build`](Self::build), calling `before_finish` with the outcome
    /// right before the terminal event goes out.
    pub fn build_with<F>(
        &self,
        roots: &[PathBuf],
        monitor: &ChangeMonitor,
        token: &CancellationToken,
        sink: &dyn EventSink,
        before_finish: F,
    ) -> BuildOutcome
    where
        F: FnOnce(&BuildOutcome),
    {
        let started = Instant::now();
        let registration = monitor.begin_registration();

        let outcome = match self.run(roots, &registration, token, sink) {
            Some(build) => {
                monitor.commit(build.roots(), registration);
                log_summary(&build, started);
                BuildOutcome::Completed(Arc::new(build))
            }
            None => {
                log::info!(
                    "index build cancelled roots={} elapsed_ms={}",
                    roots.len(),
                    started.elapsed().as_millis()
                );
                BuildOutcome::Cancelled
            }
        };

        before_finish(&outcome);
        token.reset();
        sink.emit(Event::BuildFinished {
            success: outcome.is_success(),
        });
        outcome
    }

    fn run(
        &self,
        roots: &[PathBuf],
        registration: &PendingRegistration,
        token: &CancellationToken,
        sink: &dyn EventSink,
    ) -> Option<IndexBuild> {
        let roots: Vec<PathBuf> = roots
            .iter()
            .map(|root| canonicalize_existing_path(root))
            .collect();
        let paths = discover_files(&roots, &self.config, token)?;

        let records = if self.config.parallel_indexing {
            self.index_parallel(paths, registration, token, sink)?
        } else {
            self.index_sequential(paths, registration, token, sink)?
        };

        token.check()?;
        Some(IndexBuild::new(roots, records))
    }

    fn index_sequential(
        &self,
        paths: Vec<PathBuf>,
        registration: &PendingRegistration,
        token: &CancellationToken,
        sink: &dyn EventSink,
    ) -> Option<Vec<FileRecord>> {
        let mut progress = ProgressReporter::new(paths.len());
        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            token.check()?;
            records.push(self.index_path(path, registration, token)?);
            progress.advance_and_emit(sink);
        }
        Some(records)
    }

    fn index_parallel(
        &self,
        paths: Vec<PathBuf>,
        registration: &PendingRegistration,
        token: &CancellationToken,
        sink: &dyn EventSink,
    ) -> Option<Vec<FileRecord>> {
        let progress = Mutex::new(ProgressReporter::new(paths.len()));
        // Indexed collect keeps discovery order.
        let records: Vec<Option<FileRecord>> = paths
            .into_par_iter()
            .map(|path| {
                token.check()?;
                let record = self.index_path(path, registration, token)?;
                progress.lock().advance_and_emit(sink);
                Some(record)
            })
            .collect();
        records.into_iter().collect()
    }

    fn index_path(
        &self,
        path: PathBuf,
        registration: &PendingRegistration,
        token: &CancellationToken,
    ) -> Option<FileRecord> {
        let mut record = FileRecord::new(path);
        registration.register(record.path());
        index_file(&mut record, &self.config, token)?;
        Some(record)
    }
}

fn log_summary(build: &IndexBuild, started: Instant) {
    let count = |status: RecordStatus| {
        build
            .records()
            .iter()
            .filter(|record| record.status() == status)
            .count()
    };
    log::info!(
        "index build complete roots={} files={} indexed={} oversized={} binary={} overflow={} unreadable={} elapsed_ms={}",
        build.roots().len(),
        build.len(),
        build.indexable_count(),
        count(RecordStatus::Oversized),
        count(RecordStatus::Binary),
        count(RecordStatus::TrigramOverflow),
        count(RecordStatus::Unreadable),
        started.elapsed().as_millis(),
    );
}
