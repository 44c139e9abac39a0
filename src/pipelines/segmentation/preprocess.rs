// SPDX-License-Identifier: GPL-3.0-only

//! Depth preprocessing
//!
//! Samples below the reliable range become "no data" and samples above it
//! become the far sentinel, so neither can anchor or join a region.

use super::grid::DepthGrid;
use crate::constants::{DEPTH_FAR_SENTINEL, DEPTH_NO_DATA};
use crate::errors::PipelineError;

/// Clamp a single sample against the reliable range
#[inline]
pub fn clamp_sample(depth: i16, min_reliable: i16, max_reliable: i16) -> i16 {
    if depth < min_reliable {
        DEPTH_NO_DATA
    } else if depth > max_reliable {
        DEPTH_FAR_SENTINEL
    } else {
        depth
    }
}

/// Clamp every sample of `raw` into a fresh working grid
pub fn clamp(raw: &DepthGrid, min_reliable: i16, max_reliable: i16) -> DepthGrid {
    raw.map_samples(min_reliable, max_reliable, |d| {
        clamp_sample(d, min_reliable, max_reliable)
    })
}

/// Validate a flat sample buffer and clamp it against the frame's own bounds
pub fn prepare(
    samples: Vec<i16>,
    width: u32,
    height: u32,
    min_reliable: i16,
    max_reliable: i16,
) -> Result<DepthGrid, PipelineError> {
    let raw = DepthGrid::new(width, height, samples, min_reliable, max_reliable)?;
    Ok(clamp(&raw, min_reliable, max_reliable))
}
