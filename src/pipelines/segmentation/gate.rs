// SPDX-License-Identifier: GPL-3.0-only

//! Single-flight frame admission
//!
//! At most one frame is processed at a time. A frame arriving while another is
//! in flight is rejected and must be discarded by the caller; nothing is
//! queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Admission control for the frame worker
#[derive(Debug, Default)]
pub struct FrameGate {
    in_progress: AtomicBool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a frame if none is in flight
    ///
    /// Returns `false` when a previous admission has not been released yet.
    /// Every `true` must be paired with exactly one [`release`](Self::release).
    pub fn try_admit(&self) -> bool {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clear the in-flight flag
    pub fn release(&self) {
        self.in_progress.store(false, Ordering::Release);
    }

    /// Whether a frame is currently in flight
    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Admit a frame and return a guard that releases the gate when dropped
    pub fn try_enter(self: &Arc<Self>) -> Option<Admission> {
        if self.try_admit() {
            Some(Admission {
                gate: Arc::clone(self),
            })
        } else {
            None
        }
    }
}

/// A held admission; releases the gate on drop, including during unwinding
#[derive(Debug)]
pub struct Admission {
    gate: Arc<FrameGate>,
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_second_admission_rejected() {
        let gate = FrameGate::new();
        assert!(gate.try_admit());
        assert!(!gate.try_admit());
        gate.release();
        assert!(gate.try_admit());
    }

    #[test]
    fn test_admission_guard_releases() {
        let gate = Arc::new(FrameGate::new());
        {
            let _admission = gate.try_enter().unwrap();
            assert!(gate.is_busy());
            assert!(gate.try_enter().is_none());
        }
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let gate = Arc::new(FrameGate::new());
        let gate_clone = Arc::clone(&gate);
        let result = thread::spawn(move || {
            let _admission = gate_clone.try_enter().unwrap();
            panic!("worker failed");
        })
        .join();
        assert!(result.is_err());
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_concurrent_admission_single_winner() {
        let gate = Arc::new(FrameGate::new());
        let barrier = Arc::new(Barrier::new(8));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let barrier = Arc::clone(&barrier);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    barrier.wait();
                    if gate.try_admit() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
