// SPDX-License-Identifier: GPL-3.0-only

//! Display sink that keeps only the most recent frame

use super::composite::OutputBuffer;
use super::controller::DisplaySink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Coalescing sink: a reader sees the newest published buffer, older ones are
/// replaced without being presented
#[derive(Debug, Default)]
pub struct LatestFrameSink {
    latest: Mutex<Option<Arc<OutputBuffer>>>,
    generation: AtomicU64,
}

impl LatestFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest buffer, if any frame was published yet
    pub fn latest(&self) -> Option<Arc<OutputBuffer>> {
        self.latest.lock().ok()?.clone()
    }

    /// Number of buffers published so far
    ///
    /// Readers compare generations to skip redrawing an unchanged frame.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl DisplaySink for LatestFrameSink {
    fn publish(&self, buffer: &OutputBuffer) {
        if let Ok(mut guard) = self.latest.lock() {
            *guard = Some(Arc::new(buffer.clone()));
            self.generation.fetch_add(1, Ordering::Release);
        }
    }
}
