// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame grids passed between pipeline stages
//!
//! Every stage produces a fresh grid: depth samples flow into a
//! [`MembershipGrid`], and both feed the compositor. Grids are row-major and
//! indexed by `(x, y)` with `x in [0, width)` and `y in [0, height)`.

use crate::constants::{DEPTH_FAR_SENTINEL, DEPTH_NO_DATA};
use crate::errors::PipelineError;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel average `(a + b) / 2`
    pub fn blend(self, other: Rgb) -> Rgb {
        let avg = |a: u8, b: u8| ((a as u16 + b as u16) / 2) as u8;
        Rgb {
            r: avg(self.r, other.r),
            g: avg(self.g, other.g),
            b: avg(self.b, other.b),
        }
    }

    /// Gray with every channel set to `v`
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Depth samples in millimeters with the frame's reliable-range bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthGrid {
    width: u32,
    height: u32,
    samples: Vec<i16>,
    /// Inclusive lower bound of reliable depth for this frame
    pub min_reliable: i16,
    /// Inclusive upper bound of reliable depth for this frame
    pub max_reliable: i16,
}

impl DepthGrid {
    /// Create a grid, checking that `samples` covers exactly `width * height`
    pub fn new(
        width: u32,
        height: u32,
        samples: Vec<i16>,
        min_reliable: i16,
        max_reliable: i16,
    ) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 || samples.len() != width as usize * height as usize {
            return Err(PipelineError::MalformedFrame {
                width,
                height,
                samples: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
            min_reliable,
            max_reliable,
        })
    }

    /// Grid with every sample set to `value`, reliable over the full i16 range
    pub fn filled(width: u32, height: u32, value: i16) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width as usize * height as usize],
            min_reliable: i16::MIN,
            max_reliable: i16::MAX,
        }
    }

    /// New grid of the same dimensions with `f` applied to every sample
    pub fn map_samples<F>(&self, min_reliable: i16, max_reliable: i16, f: F) -> Self
    where
        F: Fn(i16) -> i16,
    {
        Self {
            width: self.width,
            height: self.height,
            samples: self.samples.iter().map(|&d| f(d)).collect(),
            min_reliable,
            max_reliable,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Whether `(x, y)` lies inside the grid
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Row-major index of `(x, y)`
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> i16 {
        self.samples[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: i16) {
        let idx = self.index(x, y);
        self.samples[idx] = value;
    }

    /// Clamp `(x, y)` into the grid bounds
    pub fn clamp_point(&self, x: u32, y: u32) -> (u32, u32) {
        (
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        )
    }
}

/// Whether a preprocessed sample may take part in a region
///
/// No-data and far-sentinel samples never join a region. A genuine reading
/// of `i16::MAX` is indistinguishable from the sentinel and is treated as far.
#[inline]
pub fn is_reliable(depth: i16) -> bool {
    depth != DEPTH_NO_DATA && depth != DEPTH_FAR_SENTINEL
}

/// Camera colors registered to the depth grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraGrid {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl CameraGrid {
    /// Create a camera grid, checking that `pixels` covers `width * height`
    pub fn new(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(PipelineError::MalformedFrame {
                width,
                height,
                samples: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from packed 8-bit RGB triples
    pub fn from_rgb_bytes(width: u32, height: u32, rgb: &[u8]) -> Result<Self, PipelineError> {
        if rgb.len() % 3 != 0 {
            return Err(PipelineError::MalformedFrame {
                width,
                height,
                samples: rgb.len() / 3,
            });
        }
        let pixels = rgb
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Region classification of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    /// Never reached by the traversal
    #[default]
    Unvisited,
    /// Part of the seed's region
    Member,
    /// Reached but not admitted; bounds the region
    RejectedBoundary,
}

/// Per-cell region classification for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipGrid {
    width: u32,
    height: u32,
    cells: Vec<Membership>,
}

impl MembershipGrid {
    /// All cells `Unvisited`
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Membership::Unvisited; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn cells(&self) -> &[Membership] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Membership {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: Membership) {
        let idx = y as usize * self.width as usize + x as usize;
        self.cells[idx] = value;
    }

    /// Number of `Member` cells
    pub fn member_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&m| m == Membership::Member)
            .count()
    }

    /// Coordinates of all `Member` cells in row-major order
    pub fn members(&self) -> Vec<(u32, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == Membership::Member)
            .map(|(i, _)| {
                (
                    (i % self.width as usize) as u32,
                    (i / self.width as usize) as u32,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_grid_rejects_wrong_length() {
        let err = DepthGrid::new(4, 4, vec![0; 15], 0, 100).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedFrame {
                width: 4,
                height: 4,
                samples: 15
            }
        );
    }

    #[test]
    fn test_depth_grid_rejects_empty() {
        assert!(DepthGrid::new(0, 0, Vec::new(), 0, 100).is_err());
    }

    #[test]
    fn test_index_is_row_major() {
        let mut grid = DepthGrid::filled(3, 2, 0);
        grid.set(2, 1, 7);
        assert_eq!(grid.samples()[5], 7);
        assert_eq!(grid.get(2, 1), 7);
    }

    #[test]
    fn test_clamp_point() {
        let grid = DepthGrid::filled(4, 3, 0);
        assert_eq!(grid.clamp_point(10, 10), (3, 2));
        assert_eq!(grid.clamp_point(1, 1), (1, 1));
    }

    #[test]
    fn test_clamp_point_on_empty_grid() {
        let grid = DepthGrid::filled(0, 3, 100);
        assert_eq!(grid.clamp_point(5, 5), (0, 2));
    }

    #[test]
    fn test_max_value_is_not_reliable() {
        assert!(is_reliable(1));
        assert!(is_reliable(-5));
        assert!(!is_reliable(DEPTH_NO_DATA));
        assert!(!is_reliable(i16::MAX));
    }

    #[test]
    fn test_blend_averages_channels() {
        let c = Rgb::new(200, 100, 0).blend(Rgb::new(255, 0, 1));
        assert_eq!(c, Rgb::new(227, 50, 0));
    }

    #[test]
    fn test_camera_from_rgb_bytes() {
        let grid = CameraGrid::from_rgb_bytes(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(grid.get(1, 0), Rgb::new(4, 5, 6));
        assert!(CameraGrid::from_rgb_bytes(2, 1, &[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_members_coordinates() {
        let mut m = MembershipGrid::new(3, 2);
        m.set(1, 1, Membership::Member);
        m.set(0, 0, Membership::RejectedBoundary);
        assert_eq!(m.members(), vec![(1, 1)]);
        assert_eq!(m.member_count(), 1);
    }
}
