// SPDX-License-Identifier: GPL-3.0-only

//! Procedural depth sensor
//!
//! Renders a simple scene from the sensor's point of view: a wall beyond the
//! reliable range, a floor that approaches the sensor towards the bottom of
//! the frame, and a box sliding left and right in front of it. The box casts
//! a thin shadow of missing samples on its left edge and the whole frame has
//! sparse dropout speckle, like a structured-light sensor.

use super::types::{RawColorFrame, RawDepthFrame};
use super::SensorSource;
use crate::constants::{DepthRange, frame_interval};
use crate::errors::SensorError;
use crate::pipelines::segmentation::Rgb;
use std::time::Duration;

/// Wall distance, beyond the reliable range of both depth ranges
const WALL_MM: i16 = 4500;
/// Floor distance at the horizon and at the bottom row
const FLOOR_FAR_MM: f32 = 3800.0;
const FLOOR_NEAR_MM: f32 = 900.0;
/// Box front face distance
const BOX_MM: f32 = 1500.0;
/// Width of the missing-data shadow left of the box (pixels)
const SHADOW_PX: u32 = 4;
/// One color frame per this many depth frames
const COLOR_DIVIDER: u64 = 2;

/// Procedural scene source
pub struct SyntheticSensor {
    width: u32,
    height: u32,
    range: DepthRange,
    interval: Duration,
    frame_index: u64,
}

impl SyntheticSensor {
    pub fn new(width: u32, height: u32, frame_rate: u32, range: DepthRange) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            range,
            interval: frame_interval(frame_rate),
            frame_index: 0,
        }
    }

    fn horizon(&self) -> u32 {
        self.height * 11 / 20
    }

    /// Box bounds `(x0, y0, x1, y1)` (exclusive end) at frame `t`
    fn box_bounds(&self, t: u64) -> (u32, u32, u32, u32) {
        let box_w = (self.width / 5).max(1);
        let box_h = (self.height / 3).max(1);
        let phase = t as f32 * 0.05;
        let travel = (self.width.saturating_sub(box_w)) as f32 / 2.0;
        let center = self.width as f32 / 2.0 + travel * 0.8 * phase.sin();
        let x0 = (center - box_w as f32 / 2.0).max(0.0) as u32;
        let y1 = (self.horizon() + self.height / 6).min(self.height);
        let y0 = y1.saturating_sub(box_h);
        (x0, y0, (x0 + box_w).min(self.width), y1)
    }

    /// Depth and color at `(x, y)` for frame `t`
    fn sample(&self, x: u32, y: u32, t: u64) -> (i16, Rgb) {
        let (bx0, by0, bx1, by1) = self.box_bounds(t);
        if y >= by0 && y < by1 {
            if x >= bx0 && x < bx1 {
                // Slight lean so the face is not perfectly flat
                let lean = (y - by0) as f32 * 0.5;
                let shade = 180 + ((x - bx0) * 60 / (bx1 - bx0).max(1)) as u8;
                return ((BOX_MM + lean) as i16, Rgb::new(shade, 110, 30));
            }
            if x + SHADOW_PX >= bx0 && x < bx0 {
                return (0, Rgb::new(40, 40, 40));
            }
        }

        let horizon = self.horizon();
        if y < horizon {
            return (WALL_MM, Rgb::new(90, 100, 120));
        }

        let span = (self.height - horizon).max(1) as f32;
        let f = (y - horizon) as f32 / span;
        let depth = FLOOR_FAR_MM + (FLOOR_NEAR_MM - FLOOR_FAR_MM) * f;
        let tile = ((x / 32) + (y / 16)) % 2 == 0;
        let color = if tile {
            Rgb::new(150, 140, 120)
        } else {
            Rgb::new(120, 110, 95)
        };
        (depth as i16, color)
    }

    fn speckle(x: u32, y: u32, t: u64) -> bool {
        let mut h = x.wrapping_mul(73_856_093)
            ^ y.wrapping_mul(19_349_663)
            ^ (t as u32).wrapping_mul(83_492_791);
        h ^= h >> 13;
        h = h.wrapping_mul(0x5bd1_e995);
        h ^= h >> 15;
        h % 97 == 0
    }

    fn render_depth(&self, t: u64) -> Vec<i16> {
        let mut samples = Vec::with_capacity((self.width * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let (depth, _) = self.sample(x, y, t);
                samples.push(if Self::speckle(x, y, t) { 0 } else { depth });
            }
        }
        samples
    }

    fn render_color(&self, t: u64) -> Vec<u8> {
        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let (_, c) = self.sample(x, y, t);
                rgb.extend_from_slice(&[c.r, c.g, c.b]);
            }
        }
        rgb
    }
}

impl SensorSource for SyntheticSensor {
    fn name(&self) -> &str {
        "Synthetic depth sensor"
    }

    fn frame_interval(&self) -> Duration {
        self.interval
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_depth(&mut self) -> Result<RawDepthFrame, SensorError> {
        self.frame_index += 1;
        Ok(RawDepthFrame {
            samples: self.render_depth(self.frame_index),
            width: self.width,
            height: self.height,
            min_reliable: self.range.min_reliable_mm(),
            max_reliable: self.range.max_reliable_mm(),
        })
    }

    fn next_color(&mut self) -> Option<RawColorFrame> {
        if self.frame_index % COLOR_DIVIDER != 0 {
            return None;
        }
        Some(RawColorFrame {
            rgb: self.render_color(self.frame_index),
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::segmentation::{Membership, grow, preprocess};

    #[test]
    fn test_frame_dimensions() {
        let mut sensor = SyntheticSensor::new(64, 48, 30, DepthRange::Default);
        let frame = sensor.next_depth().unwrap();
        assert_eq!(frame.samples.len(), 64 * 48);
        assert_eq!((frame.min_reliable, frame.max_reliable), (800, 4000));
    }

    #[test]
    fn test_color_at_half_cadence() {
        let mut sensor = SyntheticSensor::new(16, 12, 30, DepthRange::Default);
        let mut colors = 0;
        for _ in 0..10 {
            sensor.next_depth().unwrap();
            if let Some(color) = sensor.next_color() {
                assert_eq!(color.rgb.len(), 16 * 12 * 3);
                colors += 1;
            }
        }
        assert_eq!(colors, 5);
    }

    #[test]
    fn test_box_segments_apart_from_floor() {
        let sensor = SyntheticSensor::new(160, 120, 30, DepthRange::Default);
        let t = 0;
        // Without speckle so the seed itself is never a hole
        let scene = &sensor;
        let samples: Vec<i16> = (0..120)
            .flat_map(|y| (0..160).map(move |x| scene.sample(x, y, t).0))
            .collect();
        let grid = preprocess::prepare(samples, 160, 120, 800, 4000).unwrap();
        let (bx0, by0, bx1, by1) = sensor.box_bounds(t);
        let seed = ((bx0 + bx1) / 2, (by0 + by1) / 2);

        let membership = grow(&grid, seed, 50);

        // Floor far below the box is a different surface
        assert_eq!(membership.get(seed.0, 119), Membership::Unvisited);
        let box_area = ((bx1 - bx0) * (by1 - by0)) as usize;
        assert!(membership.member_count() > box_area / 2);
        assert!(membership.member_count() <= box_area);
    }
}
