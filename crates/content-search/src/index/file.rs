//! Per-file trigram extraction.

use std::fs::File;
use std::io::{self, Read};

use memchr::memchr;

use crate::cancel::CancellationToken;
use crate::config::IndexConfig;
use crate::record::{FileRecord, RecordStatus};
use crate::trigram::TrigramAccumulator;

/// Fills `record` with the trigrams of its file.
///
/// Failures never propagate: an unreadable, oversized, binary or
/// trigram-heavy file ends up with an empty set and a non-indexed status.
///
/// Returns `None` if cancelled between chunks; the record is then
/// incomplete and must be discarded with the rest of the build.
pub fn index_file(
    record: &mut FileRecord,
    config: &IndexConfig,
    token: &CancellationToken,
) -> Option<()> {
    match fill_record(record, config, token) {
        Ok(result) => result,
        Err(error) => {
            log::debug!("unreadable {}: {}", record.path().display(), error);
            record.exclude(RecordStatus::Unreadable);
            Some(())
        }
    }
}

fn fill_record(
    record: &mut FileRecord,
    config: &IndexConfig,
    token: &CancellationToken,
) -> io::Result<Option<()>> {
    let mut file = File::open(record.path())?;
    let size = file.metadata()?.len();
    if size > config.max_readable_file_size {
        log::debug!("oversized {} ({} bytes)", record.path().display(), size);
        record.exclude(RecordStatus::Oversized);
        return Ok(Some(()));
    }

    let mut buffer = vec![0u8; config.read_chunk_size];
    let mut accumulator = TrigramAccumulator::new();

    loop {
        if token.check().is_none() {
            return Ok(None);
        }

        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        let chunk = &buffer[..read];

        if memchr(0, chunk).is_some() {
            log::debug!("binary {}", record.path().display());
            record.exclude(RecordStatus::Binary);
            return Ok(Some(()));
        }

        accumulator.feed(chunk, |trigram| record.insert(trigram));

        if record.len() > config.max_trigram_set_size {
            log::debug!(
                "trigram overflow {} (> {})",
                record.path().display(),
                config.max_trigram_set_size
            );
            record.exclude(RecordStatus::TrigramOverflow);
            return Ok(Some(()));
        }
    }

    Ok(Some(()))
}
