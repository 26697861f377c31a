//! Root enumeration.

use std::fs;
use std::path::{Path, PathBuf};

use fnv::FnvHashSet;
use ignore::WalkBuilder;

use crate::cancel::CancellationToken;
use crate::config::IndexConfig;

/// Canonicalizes a path, returning the original if canonicalization fails.
pub fn canonicalize_existing_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Collects every regular file under `roots`, in walk order.
///
/// Entries are sorted by file name within each directory so an unchanged
/// tree always yields the same sequence. A file reachable from more than one
/// root is listed once, at its first discovery. Missing roots and unreadable
/// directories are logged and skipped.
///
/// Returns `None` if cancelled.
pub fn discover_files(
    roots: &[PathBuf],
    config: &IndexConfig,
    token: &CancellationToken,
) -> Option<Vec<PathBuf>> {
    let mut seen = FnvHashSet::default();
    let mut files = Vec::new();

    for root in roots {
        token.check()?;
        if !root.exists() {
            log::warn!("index root does not exist: {}", root.display());
            continue;
        }

        let walker = WalkBuilder::new(root)
            .standard_filters(config.respect_ignore_files)
            .hidden(!config.include_hidden)
            .follow_links(config.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            token.check()?;
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    log::debug!("skipping entry under {}: {}", root.display(), error);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Some(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, relative: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, relative).unwrap();
        path
    }

    #[test]
    fn lists_files_recursively_in_name_order() {
        let dir = TempDir::new().unwrap();
        let b = touch(dir.path(), "b.txt");
        let a = touch(dir.path(), "a.txt");
        let nested = touch(dir.path(), "sub/c.txt");

        let files = discover_files(
            &[dir.path().to_path_buf()],
            &IndexConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(files, vec![a, b, nested]);
    }

    #[test]
    fn overlapping_roots_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.txt");
        let nested = touch(dir.path(), "sub/c.txt");

        let files = discover_files(
            &[dir.path().join("sub"), dir.path().to_path_buf(), a.clone()],
            &IndexConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(files, vec![nested, a]);
    }

    #[test]
    fn file_root_is_listed() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.txt");

        let files =
            discover_files(&[a.clone()], &IndexConfig::default(), &CancellationToken::new())
                .unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn missing_root_is_skipped() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.txt");

        let files = discover_files(
            &[dir.path().join("missing"), dir.path().to_path_buf()],
            &IndexConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn hidden_files_follow_config() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".hidden");
        touch(dir.path(), "shown");
        let roots = [dir.path().to_path_buf()];

        let all = discover_files(&roots, &IndexConfig::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(all.len(), 2);

        let config = IndexConfig {
            include_hidden: false,
            ..IndexConfig::default()
        };
        let visible = discover_files(&roots, &config, &CancellationToken::new()).unwrap();
        assert_eq!(visible, vec![dir.path().join("shown")]);
    }

    #[test]
    fn cancelled_walk_returns_none() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.txt");
        let token = CancellationToken::new();
        token.cancel();

        assert!(discover_files(&[dir.path().to_path_buf()], &IndexConfig::default(), &token)
            .is_none());
    }
}
