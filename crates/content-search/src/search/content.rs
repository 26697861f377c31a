//! Confirmation scans over file contents.
//!
//! The file is re-read in bounded chunks; the last `needle.len() - 1` bytes
//! of each chunk are carried into the next so matches spanning a chunk
//! boundary are found. Scanning stops at the first hit.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use memchr::memmem::Finder;

use crate::cancel::CancellationToken;

/// Checks whether the file at `path` contains `finder`'s needle.
///
/// # Returns
/// * `Some(true)` - File contains the needle
/// * `Some(false)` - File does not contain the needle (or read error)
/// * `None` - Scan was cancelled
pub fn file_contains(
    path: &Path,
    finder: &Finder<'_>,
    chunk_size: usize,
    token: &CancellationToken,
) -> Option<bool> {
    token.check()?;

    if finder.needle().is_empty() {
        return Some(false);
    }

    let Ok(mut file) = File::open(path) else {
        return Some(false);
    };

    match scan_reader(&mut file, finder, chunk_size, token) {
        Ok(found) => found,
        Err(error) => {
            log::debug!("confirmation scan failed for {}: {}", path.display(), error);
            Some(false)
        }
    }
}

/// Streams `reader` looking for the needle.
pub fn scan_reader<R: Read>(
    reader: &mut R,
    finder: &Finder<'_>,
    chunk_size: usize,
    token: &CancellationToken,
) -> io::Result<Option<bool>> {
    let overlap = finder.needle().len().saturating_sub(1);
    let chunk_size = chunk_size.max(1);

    // Room for the carried overlap plus one fresh chunk.
    let mut buffer = vec![0u8; overlap + chunk_size];
    let mut carry_len = 0usize;

    loop {
        if token.check().is_none() {
            return Ok(None);
        }

        let read = match reader.read(&mut buffer[carry_len..carry_len + chunk_size]) {
            Ok(0) => break,
            Ok(count) => count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };

        let filled = carry_len + read;
        if finder.find(&buffer[..filled]).is_some() {
            return Ok(Some(true));
        }

        let keep = overlap.min(filled);
        buffer.copy_within(filled - keep..filled, 0);
        carry_len = keep;
    }

    Ok(Some(false))
}
