//! Cooperative cancellation for indexing and search.
//!
//! A token is a shared flag. The caller sets it from any thread; the worker
//! polls it at file and chunk boundaries and never gets interrupted mid-read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable handle to a shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Observed at the next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Checkpoint for use with `?`.
    ///
    /// Returns `Some(())` while active, `None` once cancelled.
    #[inline]
    pub fn check(&self) -> Option<()> {
        if self.is_cancelled() {
            None
        } else {
            Some(())
        }
    }

    /// Clears the flag so the token can be reused by the next operation.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_is_active() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_some());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let worker_side = token.clone();
        token.cancel();
        assert!(worker_side.is_cancelled());
        assert!(worker_side.check().is_none());
    }

    #[test]
    fn reset_reactivates() {
        let token = CancellationToken::new();
        token.cancel();
        token.reset();
        assert!(token.check().is_some());
    }
}
