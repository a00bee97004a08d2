//! Progress reporting and cooperative cancellation for blending runs.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Fraction of the run spent compositing sites; the remainder covers the collapse.
pub(crate) const COMPOSITE_SHARE: f32 = 0.9;

/// Shareable progress fraction in `[0, 1]`.
///
/// Clones observe the same value, so a UI thread can poll while a worker runs.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    bits: Arc<AtomicU32>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub(crate) fn reset(&self) {
        self.bits.store(0.0f32.to_bits(), Ordering::Relaxed);
    }

    /// Raise the fraction to `value`. Never moves backwards.
    pub(crate) fn advance_to(&self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        let _ = self
            .bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                (value > f32::from_bits(current)).then_some(value.to_bits())
            });
    }
}

/// Shareable cancellation request, polled between sites.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Clear a previous request so the flag can be reused for another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let progress = Progress::new();
        assert_eq!(progress.get(), 0.0);
        progress.advance_to(0.4);
        progress.advance_to(0.2);
        assert_eq!(progress.get(), 0.4);
        progress.advance_to(2.0);
        assert_eq!(progress.get(), 1.0);
        progress.reset();
        assert_eq!(progress.get(), 0.0);
    }

    #[test]
    fn test_progress_clones_share_state() {
        let progress = Progress::new();
        let observer = progress.clone();
        progress.advance_to(0.5);
        assert_eq!(observer.get(), 0.5);
    }

    #[test]
    fn test_cancel_flag_shared() {
        let flag = CancelFlag::new();
        let worker = flag.clone();
        assert!(!worker.is_cancelled());
        flag.cancel();
        assert!(worker.is_cancelled());
        flag.reset();
        assert!(!worker.is_cancelled());
    }
}
