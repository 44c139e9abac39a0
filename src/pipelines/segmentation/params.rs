// SPDX-License-Identifier: GPL-3.0-only

//! Segmentation parameters shared with the control context
//!
//! Input handlers update single fields; the worker takes one snapshot of all
//! fields at the start of each frame so a frame never mixes old and new values.

use super::grid::Rgb;
use crate::config::Config;
use crate::constants::{DEFAULT_HIGHLIGHT_COLOR, DEFAULT_TOLERANCE};
use std::sync::{Mutex, MutexGuard};

/// Parameters for one frame's segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegParams {
    /// Maximum depth difference (exclusive) between connected neighbors
    pub tolerance: u32,
    /// Region seed in pixel coordinates
    pub seed: (u32, u32),
    /// Blend with camera colors instead of rendering depth
    pub use_camera_overlay: bool,
    /// Color applied to region members
    pub highlight_color: Rgb,
}

impl Default for SegParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            seed: (0, 0),
            use_camera_overlay: false,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
        }
    }
}

impl SegParams {
    /// Parameters seeded from user configuration, seed at the frame center
    pub fn from_config(config: &Config) -> Self {
        Self {
            tolerance: config.tolerance,
            seed: (config.width / 2, config.height / 2),
            use_camera_overlay: config.use_camera_overlay,
            highlight_color: config.highlight_color.into(),
        }
    }

    pub fn with_seed(mut self, x: u32, y: u32) -> Self {
        self.seed = (x, y);
        self
    }

    /// Copy with the seed clamped into a `width x height` frame
    pub fn clamped_to(mut self, width: u32, height: u32) -> Self {
        self.seed = (
            self.seed.0.min(width.saturating_sub(1)),
            self.seed.1.min(height.saturating_sub(1)),
        );
        self
    }
}

/// Thread-safe holder for [`SegParams`]
#[derive(Debug, Default)]
pub struct SharedParams {
    inner: Mutex<SegParams>,
}

impl SharedParams {
    pub fn new(params: SegParams) -> Self {
        Self {
            inner: Mutex::new(params),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SegParams> {
        // Params are plain values; a panicked writer cannot leave them torn
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read every field under one critical section
    pub fn snapshot(&self) -> SegParams {
        *self.lock()
    }

    pub fn set_seed(&self, x: u32, y: u32) {
        self.lock().seed = (x, y);
    }

    pub fn set_tolerance(&self, tolerance: u32) {
        self.lock().tolerance = tolerance;
    }

    pub fn set_overlay(&self, enabled: bool) {
        self.lock().use_camera_overlay = enabled;
    }

    pub fn set_highlight_color(&self, color: Rgb) {
        self.lock().highlight_color = color;
    }

    /// Apply a read-modify-write under one critical section
    pub fn update<F: FnOnce(&mut SegParams)>(&self, f: F) {
        f(&mut self.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_setters_visible_in_snapshot() {
        let params = SharedParams::default();
        params.set_seed(3, 4);
        params.set_tolerance(12);
        params.set_overlay(true);
        params.set_highlight_color(Rgb::new(1, 2, 3));

        let snap = params.snapshot();
        assert_eq!(snap.seed, (3, 4));
        assert_eq!(snap.tolerance, 12);
        assert!(snap.use_camera_overlay);
        assert_eq!(snap.highlight_color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_clamped_to_frame() {
        let params = SegParams {
            seed: (1000, 5),
            ..SegParams::default()
        };
        assert_eq!(params.clamped_to(640, 480).seed, (639, 5));
    }

    #[test]
    fn test_snapshot_never_tears() {
        // Writer keeps tolerance == seed.x; every snapshot must agree
        let params = Arc::new(SharedParams::default());
        let writer_params = Arc::clone(&params);
        let writer = thread::spawn(move || {
            for i in 0..10_000u32 {
                writer_params.update(|p| {
                    p.tolerance = i;
                    p.seed = (i, i);
                });
            }
        });

        for _ in 0..10_000 {
            let snap = params.snapshot();
            assert_eq!(snap.tolerance, snap.seed.0);
        }
        writer.join().unwrap();
    }
}
