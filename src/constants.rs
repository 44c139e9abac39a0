// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Depth range, marker color and sensor timing values used across the
//! segmentation pipeline and the reference sensor sources.

use crate::pipelines::segmentation::Rgb;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Depth value meaning "no data" (sensor dropout or below the reliable range)
pub const DEPTH_NO_DATA: i16 = 0;

/// Sentinel written for samples beyond the reliable range ("far/unreliable")
pub const DEPTH_FAR_SENTINEL: i16 = i16::MAX;

/// Marker drawn on the seed pixel, overriding every other rule
pub const SEED_MARKER_COLOR: Rgb = Rgb::new(255, 0, 0);

/// Default highlight for region members
pub const DEFAULT_HIGHLIGHT_COLOR: Rgb = Rgb::new(255, 0, 0);

/// Color for depth samples without data when no camera overlay is active
pub const NO_DATA_COLOR: Rgb = Rgb::new(0, 255, 0);

/// Color for cells that bound the region
pub const REJECTED_COLOR: Rgb = Rgb::new(128, 0, 128);

/// Highlight colors offered by the interactive viewer
pub const HIGHLIGHT_PALETTE: [Rgb; 4] = [
    Rgb::new(255, 0, 0),
    Rgb::new(0, 160, 255),
    Rgb::new(255, 200, 0),
    Rgb::new(255, 255, 255),
];

/// Bytes per pixel in the output buffer (B, G, R, pad)
pub const OUTPUT_BYTES_PER_PIXEL: usize = 4;

/// Default maximum depth difference between connected neighbors (mm)
pub const DEFAULT_TOLERANCE: u32 = 50;

/// Upper bound accepted from interactive tolerance adjustment
pub const MAX_TOLERANCE: u32 = 2000;

/// Step used by the viewer for tolerance adjustment
pub const TOLERANCE_STEP: u32 = 5;

/// Native depth stream resolution
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

/// Native depth stream rate
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Depth stream operating range
///
/// Kinect-class sensors report a narrower but closer reliable band when
/// "near mode" is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthRange {
    /// Standard range (800-4000 mm)
    #[default]
    Default,
    /// Near mode (400-3000 mm)
    Near,
}

impl DepthRange {
    /// Minimum reliable depth (mm) for this range
    pub fn min_reliable_mm(&self) -> i16 {
        match self {
            DepthRange::Default => 800,
            DepthRange::Near => 400,
        }
    }

    /// Maximum reliable depth (mm) for this range
    pub fn max_reliable_mm(&self) -> i16 {
        match self {
            DepthRange::Default => 4000,
            DepthRange::Near => 3000,
        }
    }

    /// Get display name for the range
    pub fn display_name(&self) -> &'static str {
        match self {
            DepthRange::Default => "Default",
            DepthRange::Near => "Near",
        }
    }
}

/// Interval between frames for a given rate (falls back to 30 fps for 0)
pub fn frame_interval(frame_rate: u32) -> Duration {
    let rate = if frame_rate == 0 {
        DEFAULT_FRAME_RATE
    } else {
        frame_rate
    };
    Duration::from_micros(1_000_000 / rate as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_near_range_is_closer() {
        assert!(DepthRange::Near.min_reliable_mm() < DepthRange::Default.min_reliable_mm());
        assert!(DepthRange::Near.max_reliable_mm() < DepthRange::Default.max_reliable_mm());
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(30), Duration::from_micros(33_333));
        assert_eq!(frame_interval(0), frame_interval(DEFAULT_FRAME_RATE));
    }
}
