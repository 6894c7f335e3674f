//! Single-owner lock over the map camera
//!
//! Only one camera animation may be in flight. Whoever animates the camera
//! (the fitter, zoom buttons, locate-me) must hold a [`CameraGuard`] until the
//! animation settles. Acquisition never waits: a caller that finds the lock
//! held drops its request instead of queueing it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CameraLock {
    busy: Arc<AtomicBool>,
}

impl CameraLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if another animation holds the camera.
    pub fn try_acquire(&self) -> Option<CameraGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CameraGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the camera when dropped, including on error paths.
#[derive(Debug)]
#[must_use = "the camera is released as soon as the guard is dropped"]
pub struct CameraGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for CameraGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails() {
        let lock = CameraLock::new();
        let guard = lock.try_acquire();
        assert!(guard.is_some());
        assert!(lock.is_busy());
        assert!(lock.try_acquire().is_none());
    }

    #[test]
    fn test_drop_releases() {
        let lock = CameraLock::new();
        {
            let _guard = lock.try_acquire().unwrap();
            assert!(lock.is_busy());
        }
        assert!(!lock.is_busy());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = CameraLock::new();
        let other = lock.clone();
        let _guard = lock.try_acquire().unwrap();
        assert!(other.is_busy());
        assert!(other.try_acquire().is_none());
    }
}
