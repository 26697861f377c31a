//! Change monitoring for indexed files.
//!
//! The monitor only raises [`Event::ReindexRequested`]; it never touches an
//! index. Paths are collected per build in a [`PendingRegistration`] and
//! become the watched set only when that build is committed.
//!
//! One save usually arrives as several OS events (truncate, write, close).
//! The first change to a watched file latches a pending request; later
//! changes are absorbed until the next commit or clear.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fnv::FnvHashSet;
use notify::{
    recommended_watcher, Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode,
    Watcher,
};
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, SearchError};
use crate::events::{Event, EventSink};

struct MonitorShared {
    watched: RwLock<FnvHashSet<PathBuf>>,
    /// Set once a reindex request went out for the current watched set.
    requested: AtomicBool,
    sink: Arc<dyn EventSink>,
}

impl MonitorShared {
    fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            watched: RwLock::new(FnvHashSet::default()),
            requested: AtomicBool::new(false),
            sink,
        }
    }

    /// Returns true if any of `paths` is watched. Only the first such change
    /// since the last reset emits a request.
    fn raise_if_watched<'a, I>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let hit = {
            let watched = self.watched.read();
            paths.into_iter().any(|path| watched.contains(path))
        };
        if hit && !self.requested.swap(true, Ordering::SeqCst) {
            self.sink.emit(Event::ReindexRequested);
        }
        hit
    }

    fn replace_watched(&self, paths: FnvHashSet<PathBuf>) {
        *self.watched.write() = paths;
        self.requested.store(false, Ordering::SeqCst);
    }
}

/// Paths registered by an in-progress build.
///
/// Registration is synchronized so parallel indexing can share it.
#[derive(Debug, Default)]
pub struct PendingRegistration {
    paths: Mutex<Vec<PathBuf>>,
}

impl PendingRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: &Path) {
        self.paths.lock().push(path.to_path_buf());
    }

    fn into_paths(self) -> Vec<PathBuf> {
        self.paths.into_inner()
    }
}

/// Watches the files of the most recent successful build.
pub struct ChangeMonitor {
    shared: Arc<MonitorShared>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl std::fmt::Debug for ChangeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMonitor")
            .field("watched", &self.shared.watched.read().len())
            .field("requested", &self.is_reindex_requested())
            .field("watcher", &"<watcher>")
            .finish()
    }
}

impl ChangeMonitor {
    /// Creates a monitor with an empty watched set.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            shared: Arc::new(MonitorShared::new(sink)),
            watcher: Mutex::new(None),
        }
    }

    /// Starts collecting paths for a new build.
    pub fn begin_registration(&self) -> PendingRegistration {
        PendingRegistration::new()
    }

    /// Replaces the watched set with a finished build's registrations and
    /// re-arms OS notifications for its roots. A pending reindex request is
    /// considered answered.
    ///
    /// Watch failures are logged; manual [`notify_changed`](Self::notify_changed)
    /// keeps working either way.
    pub fn commit(&self, roots: &[PathBuf], pending: PendingRegistration) {
        let paths = pending.into_paths();
        let count = paths.len();
        self.shared.replace_watched(paths.into_iter().collect());

        let mut slot = self.watcher.lock();
        // Dropping the previous watcher releases its OS watches.
        *slot = None;
        match create_watcher(self.shared.clone(), roots) {
            Ok(watcher) => *slot = Some(watcher),
            Err(error) => log::warn!("change notifications disabled: {}", error),
        }
        log::info!("change monitor watching files={} roots={}", count, roots.len());
    }

    /// Forgets every watched path and stops OS notifications.
    pub fn clear(&self) {
        self.shared.replace_watched(FnvHashSet::default());
        *self.watcher.lock() = None;
    }

    /// Feeds an external change notification and returns whether `path` is
    /// watched.
    ///
    /// A request is emitted only if none is pending for the current
    /// watched set.
    pub fn notify_changed(&self, path: &Path) -> bool {
        self.shared.raise_if_watched(std::iter::once(path))
    }

    /// Returns true while a reindex request is waiting for the next commit.
    pub fn is_reindex_requested(&self) -> bool {
        self.shared.requested.load(Ordering::SeqCst)
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.shared.watched.read().contains(path)
    }

    pub fn watched_len(&self) -> usize {
        self.shared.watched.read().len()
    }
}

fn create_watcher(shared: Arc<MonitorShared>, roots: &[PathBuf]) -> Result<RecommendedWatcher> {
    let callback_shared = shared.clone();
    let mut watcher = recommended_watcher(move |event_result: notify::Result<NotifyEvent>| {
        match event_result {
            Ok(event) => apply_notify_event(&callback_shared, event),
            Err(error) => log::warn!("filesystem watcher error: {}", error),
        }
    })
    .map_err(|error| SearchError::Watch(format!("failed to create watcher: {error}")))?;

    for root in roots {
        let (target, mode) = if root.is_dir() {
            (root.clone(), RecursiveMode::Recursive)
        } else {
            (
                root.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.clone()),
                RecursiveMode::NonRecursive,
            )
        };
        if let Err(error) = watcher.watch(&target, mode) {
            log::warn!("failed to watch {}: {}", target.display(), error);
        }
    }

    Ok(watcher)
}

fn apply_notify_event(shared: &MonitorShared, event: NotifyEvent) {
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }
    if shared.raise_if_watched(event.paths.iter().map(PathBuf::as_path)) {
        log::debug!("watched file changed: {:?}", event.paths);
    }
}
