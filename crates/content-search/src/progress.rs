//! Percentage reporting for a single pass.

use crate::events::{Event, EventSink};

/// Tracks processed / discovered items and reports a non-decreasing percent.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    discovered: usize,
    processed: usize,
    last_percent: u8,
}

impl ProgressReporter {
    /// Creates a reporter for a pass over `discovered` items.
    pub fn new(discovered: usize) -> Self {
        Self {
            discovered,
            processed: 0,
            last_percent: 0,
        }
    }

    /// Marks one item processed and returns the percent to report.
    ///
    /// The value never goes backwards within a pass and saturates at 100
    /// when more items are processed than were discovered.
    pub fn advance(&mut self) -> u8 {
        self.processed += 1;
        let percent = percent_of(self.processed, self.discovered.max(self.processed));
        self.last_percent = self.last_percent.max(percent);
        self.last_percent
    }

    /// Marks one item processed and emits the resulting percent.
    pub fn advance_and_emit(&mut self, sink: &dyn EventSink) {
        let percent = self.advance();
        sink.emit(Event::Progress(percent));
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent
    }
}

fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) as u128 * 100) / total as u128) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_one_hundred() {
        let mut progress = ProgressReporter::new(4);
        let seen: Vec<u8> = (0..4).map(|_| progress.advance()).collect();
        assert_eq!(seen, vec![25, 50, 75, 100]);
    }

    #[test]
    fn overshoot_saturates() {
        let mut progress = ProgressReporter::new(1);
        assert_eq!(progress.advance(), 100);
        assert_eq!(progress.advance(), 100);
        assert_eq!(progress.processed(), 2);
    }

    #[test]
    fn rounds_down() {
        let mut progress = ProgressReporter::new(3);
        assert_eq!(progress.advance(), 33);
        assert_eq!(progress.advance(), 66);
        assert_eq!(progress.last_percent(), 66);
    }

    #[test]
    fn empty_pass_is_complete() {
        assert_eq!(percent_of(0, 0), 100);
    }
}
