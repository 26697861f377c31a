//! SearchSession - caller-facing API that runs builds and searches on a
//! background worker.
//!
//! A session runs at most one operation at a time. Every operation ends with
//! its terminal event (`BuildFinished` or `SearchFinished`), and by the time
//! that event is delivered the session is idle again and a successful build
//! is already published, so the caller can react to it immediately.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::RwLock;

use crate::cancel::CancellationToken;
use crate::config::IndexConfig;
use crate::error::{Result, SearchError};
use crate::events::{Event, EventSink};
use crate::index::IndexBuilder;
use crate::record::IndexBuild;
use crate::search::SearchEngine;
use crate::watcher::ChangeMonitor;

/// Owns the current index build, its change monitor and the worker thread.
pub struct SearchSession {
    config: IndexConfig,
    builder: IndexBuilder,
    engine: SearchEngine,
    sink: Arc<dyn EventSink>,
    monitor: Arc<ChangeMonitor>,
    token: CancellationToken,
    current: Arc<RwLock<Option<Arc<IndexBuild>>>>,
    last_roots: Vec<PathBuf>,
    active: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("config", &self.config)
            .field("monitor", &self.monitor)
            .field("last_roots", &self.last_roots)
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl SearchSession {
    /// Creates a session whose events are delivered on the returned channel.
    pub fn new(config: IndexConfig) -> Result<(Self, Receiver<Event>)> {
        let (tx, rx) = mpsc::channel();
        let session = Self::with_sink(config, Arc::new(tx))?;
        Ok((session, rx))
    }

    /// Creates a session that reports to a caller-provided sink.
    pub fn with_sink(config: IndexConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: IndexBuilder::new(config.clone()),
            engine: SearchEngine::new(config.clone()),
            monitor: Arc::new(ChangeMonitor::new(sink.clone())),
            config,
            sink,
            token: CancellationToken::new(),
            current: Arc::new(RwLock::new(None)),
            last_roots: Vec::new(),
            active: Arc::new(AtomicBool::new(false)),
            worker: None,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The published index build, if the last indexing pass succeeded.
    pub fn index(&self) -> Option<Arc<IndexBuild>> {
        self.current.read().clone()
    }

    /// Roots of the most recent indexing request.
    pub fn roots(&self) -> &[PathBuf] {
        &self.last_roots
    }

    pub fn monitor(&self) -> &ChangeMonitor {
        &self.monitor
    }

    /// Returns true while a build or search is running.
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Starts indexing `roots` in the background.
    ///
    /// The previous build and its watched files are dropped right away; the
    /// new build is published only if the pass completes.
    pub fn start_indexing(&mut self, roots: Vec<PathBuf>) -> Result<()> {
        self.ensure_idle()?;

        *self.current.write() = None;
        self.monitor.clear();
        self.last_roots = roots.clone();

        let builder = self.builder.clone();
        let monitor = self.monitor.clone();
        let token = self.token.clone();
        let sink = self.sink.clone();
        let current = self.current.clone();
        let active = self.active.clone();

        self.spawn("content-index", move || {
            builder.build_with(&roots, &monitor, &token, sink.as_ref(), |outcome| {
                if let Some(build) = outcome.build() {
                    *current.write() = Some(build.clone());
                }
                active.store(false, Ordering::SeqCst);
            });
        })
    }

    /// Starts searching the published build for `pattern`.
    pub fn start_search(&mut self, pattern: &str) -> Result<()> {
        self.config.validate_pattern(pattern)?;
        self.ensure_idle()?;
        let build = self.index().ok_or(SearchError::NoIndex)?;

        let engine = self.engine.clone();
        let pattern = pattern.to_string();
        let token = self.token.clone();
        let sink = self.sink.clone();
        let active = self.active.clone();

        self.spawn("content-search", move || {
            engine.search_with(&build, &pattern, &token, sink.as_ref(), |_| {
                active.store(false, Ordering::SeqCst);
            });
        })
    }

    /// Requests cancellation of the running operation, if any.
    ///
    /// A request made while idle is discarded when the next operation starts.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels whatever is running and rebuilds from the last roots.
    ///
    /// This is the caller's answer to [`Event::ReindexRequested`].
    pub fn reindex(&mut self) -> Result<()> {
        if self.last_roots.is_empty() {
            return Err(SearchError::NoIndex);
        }
        self.cancel();
        self.wait();
        let roots = self.last_roots.clone();
        self.start_indexing(roots)
    }

    /// Blocks until the running operation, if any, has finished.
    pub fn wait(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("search session worker panicked");
                self.active.store(false, Ordering::SeqCst);
            }
        }
    }

    fn ensure_idle(&mut self) -> Result<()> {
        let finished = self
            .worker
            .as_ref()
            .map_or(true, |handle| handle.is_finished());
        if self.is_busy() && !finished {
            return Err(SearchError::Busy);
        }
        // The worker has already emitted its terminal event; reap it.
        self.wait();
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn<F>(&mut self, name: &str, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.token.reset();
        self.active.store(true, Ordering::SeqCst);
        match thread::Builder::new().name(name.to_string()).spawn(work) {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(error) => {
                self.active.store(false, Ordering::SeqCst);
                Err(SearchError::Io(error))
            }
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel();
        self.wait();
    }
}
