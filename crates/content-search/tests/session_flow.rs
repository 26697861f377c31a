use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use content_search::{Event, IndexConfig, SearchError, SearchSession};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(10);
const SETTLE: Duration = Duration::from_millis(500);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Collects events up to and including the next terminal one.
fn until_terminal(rx: &Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        let event = rx.recv_timeout(TIMEOUT).expect("terminal event");
        let terminal = matches!(event, Event::BuildFinished { .. } | Event::SearchFinished);
        events.push(event);
        if terminal {
            return events;
        }
    }
}

fn matches_in(events: &[Event]) -> Vec<PathBuf> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::MatchFound(path) => Some(path.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn index_then_search_reports_matches() {
    init_logging();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello world").unwrap();
    fs::write(dir.path().join("b.txt"), "goodbye").unwrap();

    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();
    let build_events = until_terminal(&rx);
    assert_eq!(
        build_events.last(),
        Some(&Event::BuildFinished { success: true })
    );
    assert!(build_events.contains(&Event::Progress(100)));

    session.start_search("hello").unwrap();
    let search_events = until_terminal(&rx);
    let found = matches_in(&search_events);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].file_name().unwrap(), "a.txt");
    assert_eq!(search_events.last(), Some(&Event::SearchFinished));
}

#[test]
fn only_one_operation_runs_at_a_time() {
    let dir = TempDir::new().unwrap();
    for i in 0..200 {
        fs::write(dir.path().join(format!("f{i}.txt")), "some content").unwrap();
    }
    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();

    // Either still running (rejected) or already done; never two at once.
    match session.start_indexing(vec![dir.path().to_path_buf()]) {
        Err(SearchError::Busy) => {
            until_terminal(&rx);
        }
        Ok(()) => {
            until_terminal(&rx);
            until_terminal(&rx);
        }
        Err(other) => panic!("unexpected error {other}"),
    }
    session.wait();
    assert!(!session.is_busy());
}

#[test]
fn cancel_always_ends_with_one_terminal_event() {
    let dir = TempDir::new().unwrap();
    for i in 0..50 {
        fs::write(dir.path().join(format!("f{i}.txt")), "abcdef").unwrap();
    }
    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();
    session.cancel();

    let events = until_terminal(&rx);
    let success = match events.last() {
        Some(Event::BuildFinished { success }) => *success,
        other => panic!("unexpected terminal {other:?}"),
    };
    session.wait();
    assert!(rx.try_recv().is_err());
    // A cancelled build publishes nothing; a build that won the race does.
    assert_eq!(session.index().is_some(), success);
}

#[test]
fn change_to_watched_file_requests_reindex() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "old text").unwrap();

    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();
    until_terminal(&rx);

    let watched = session.index().unwrap().records()[0].path().to_path_buf();
    assert!(session.monitor().is_watched(&watched));

    fs::write(&file, "new text").unwrap();
    assert!(session.monitor().notify_changed(&watched));
    let requested = loop {
        match rx.recv_timeout(TIMEOUT).expect("reindex request") {
            Event::ReindexRequested => break true,
            _ => continue,
        }
    };
    assert!(requested);

    session.reindex().unwrap();
    until_terminal(&rx);
    session.start_search("new text").unwrap();
    let found = matches_in(&until_terminal(&rx));
    assert_eq!(found, vec![watched]);
}

#[test]
fn one_save_raises_one_reindex_request() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "old text").unwrap();

    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();
    until_terminal(&rx);

    // Truncate plus write reaches the OS watcher as several events.
    fs::write(&file, "new text").unwrap();
    loop {
        match rx.recv_timeout(TIMEOUT).expect("reindex request") {
            Event::ReindexRequested => break,
            _ => continue,
        }
    }
    thread::sleep(SETTLE);
    fs::write(&file, "newer text").unwrap();
    thread::sleep(SETTLE);

    let extra = rx
        .try_iter()
        .filter(|event| *event == Event::ReindexRequested)
        .count();
    assert_eq!(extra, 0);
    assert!(session.monitor().is_reindex_requested());

    session.reindex().unwrap();
    until_terminal(&rx);
    assert!(!session.monitor().is_reindex_requested());
}

#[test]
fn unwatched_path_is_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "text").unwrap();
    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();
    until_terminal(&rx);

    assert!(!session
        .monitor()
        .notify_changed(&dir.path().join("elsewhere.txt")));
}

#[test]
fn starting_a_new_build_drops_the_previous_index() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "text").unwrap();
    let (mut session, rx) = SearchSession::new(IndexConfig::default()).unwrap();
    session.start_indexing(vec![dir.path().to_path_buf()]).unwrap();
    until_terminal(&rx);
    assert!(session.index().is_some());

    let empty = TempDir::new().unwrap();
    session.start_indexing(vec![empty.path().to_path_buf()]).unwrap();
    until_terminal(&rx);
    let index = session.index().unwrap();
    assert!(index.is_empty());
    assert_eq!(session.monitor().watched_len(), 0);
}
