//! Cooperative stop signal for a batch.
//!
//! A task that detects a fatal condition raises the signal; the dispatch loop
//! checks it before starting each album. Albums already running finish
//! normally. Callers may also hold a clone and raise it from outside (Ctrl-C).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[derive(Debug, Default)]
struct AbortState {
    raised: AtomicBool,
    reason: OnceLock<String>,
}

/// Shared, clonable abort flag with the reason of the first raiser.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    inner: Arc<AbortState>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Returns true only for the first caller, whose reason is kept.
    pub fn raise(&self, reason: impl Into<String>) -> bool {
        let first = self
            .inner
            .raised
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if first {
            let _ = self.inner.reason.set(reason.into());
        }
        first
    }

    pub fn is_raised(&self) -> bool {
        self.inner.raised.load(Ordering::Acquire)
    }

    pub fn reason(&self) -> Option<String> {
        self.inner.reason.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_raise_wins() {
        let signal = AbortSignal::new();
        assert!(!signal.is_raised());
        assert!(signal.reason().is_none());

        let clone = signal.clone();
        assert!(clone.raise("bad credentials"));
        assert!(!signal.raise("interrupted"));

        assert!(signal.is_raised());
        assert_eq!(signal.reason().as_deref(), Some("bad credentials"));
    }
}
