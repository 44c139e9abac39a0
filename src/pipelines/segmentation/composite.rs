// SPDX-License-Identifier: GPL-3.0-only

//! Compositing depth, region membership and camera colors into a BGR32 buffer
//!
//! Output layout matches a `Bgr32` bitmap: 4 bytes per pixel, row-major,
//! channel order B, G, R followed by an unused pad byte written as 0.

use super::grid::{CameraGrid, DepthGrid, Membership, MembershipGrid, Rgb};
use crate::constants::{
    DEPTH_NO_DATA, NO_DATA_COLOR, OUTPUT_BYTES_PER_PIXEL, REJECTED_COLOR, SEED_MARKER_COLOR,
};
use crate::errors::PipelineError;
use bytemuck::{Pod, Zeroable};

/// One packed output pixel
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
struct Bgrx {
    b: u8,
    g: u8,
    r: u8,
    pad: u8,
}

impl From<Rgb> for Bgrx {
    fn from(c: Rgb) -> Self {
        Self {
            b: c.b,
            g: c.g,
            r: c.r,
            pad: 0,
        }
    }
}

impl From<Bgrx> for Rgb {
    fn from(p: Bgrx) -> Self {
        Rgb::new(p.r, p.g, p.b)
    }
}

/// Composited frame ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl OutputBuffer {
    /// Bytes per row
    pub fn stride(&self) -> u32 {
        self.width * OUTPUT_BYTES_PER_PIXEL as u32
    }

    /// Color at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let idx = (y * self.stride() + x * OUTPUT_BYTES_PER_PIXEL as u32) as usize;
        Rgb::new(self.bytes[idx + 2], self.bytes[idx + 1], self.bytes[idx])
    }
}

/// Pack colors as (B, G, R, 0)
pub fn colors_to_bytes(colors: &[Rgb]) -> Vec<u8> {
    let pixels: Vec<Bgrx> = colors.iter().map(|&c| Bgrx::from(c)).collect();
    bytemuck::cast_slice::<Bgrx, u8>(&pixels).to_vec()
}

/// Unpack (B, G, R, pad) bytes; the pad byte is ignored
pub fn bytes_to_colors(bytes: &[u8]) -> Result<Vec<Rgb>, PipelineError> {
    let pixels: &[Bgrx] = bytemuck::try_cast_slice(bytes)
        .map_err(|_| PipelineError::InvalidPixelBuffer(bytes.len()))?;
    Ok(pixels.iter().map(|&p| Rgb::from(p)).collect())
}

/// Grayscale for a depth sample: the low 8 bits, replicated
#[inline]
fn depth_gray(depth: i16) -> Rgb {
    Rgb::gray(depth as u8)
}

/// Color of one pixel
fn pixel_color(
    depth: i16,
    membership: Membership,
    camera: Option<Rgb>,
    highlight_color: Rgb,
    is_seed: bool,
) -> Rgb {
    if is_seed {
        return SEED_MARKER_COLOR;
    }
    match camera {
        Some(base) => match membership {
            Membership::Member => base.blend(highlight_color),
            Membership::RejectedBoundary | Membership::Unvisited => base,
        },
        None => match membership {
            Membership::Member => highlight_color,
            Membership::RejectedBoundary => REJECTED_COLOR,
            Membership::Unvisited if depth == DEPTH_NO_DATA => NO_DATA_COLOR,
            Membership::Unvisited => depth_gray(depth),
        },
    }
}

/// Composite one frame
///
/// Fails with [`PipelineError::DimensionMismatch`] before writing anything if
/// the camera grid or membership grid does not match the depth grid.
pub fn composite(
    grid: &DepthGrid,
    membership: &MembershipGrid,
    camera: Option<&CameraGrid>,
    highlight_color: Rgb,
    seed: (u32, u32),
) -> Result<OutputBuffer, PipelineError> {
    let (width, height) = grid.dimensions();

    if let Some(camera) = camera
        && camera.dimensions() != grid.dimensions()
    {
        return Err(PipelineError::DimensionMismatch {
            depth: grid.dimensions(),
            camera: camera.dimensions(),
        });
    }
    if membership.dimensions() != grid.dimensions() {
        return Err(PipelineError::DimensionMismatch {
            depth: grid.dimensions(),
            camera: membership.dimensions(),
        });
    }

    let mut colors = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            colors.push(pixel_color(
                grid.get(x, y),
                membership.get(x, y),
                camera.map(|c| c.get(x, y)),
                highlight_color,
                (x, y) == seed,
            ));
        }
    }

    Ok(OutputBuffer {
        bytes: colors_to_bytes(&colors),
        width,
        height,
    })
}
