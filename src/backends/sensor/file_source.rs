// SPDX-License-Identifier: GPL-3.0-only

//! Depth replay from image files
//!
//! Loads a 16-bit grayscale PNG of millimeter depths (the format most depth
//! tools export) and, optionally, a color image of the same size. The depth
//! frame is repeated at the configured frame rate; the color frame is
//! delivered once since it never changes.

use super::types::{RawColorFrame, RawDepthFrame};
use super::SensorSource;
use crate::constants::{DepthRange, frame_interval};
use crate::errors::SensorError;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Replays a still depth image as a sensor stream
pub struct FileSensor {
    name: String,
    depth: RawDepthFrame,
    color: Option<RawColorFrame>,
    color_sent: bool,
    interval: Duration,
}

impl FileSensor {
    /// Load `depth_path` and the optional `color_path`
    ///
    /// A color image whose size differs from the depth image is still loaded;
    /// the pipeline reports the mismatch when it tries to overlay it.
    pub fn open(
        depth_path: &Path,
        color_path: Option<&Path>,
        range: DepthRange,
        frame_rate: u32,
    ) -> Result<Self, SensorError> {
        if !depth_path.exists() {
            return Err(SensorError::NotFound);
        }

        let depth_image = image::open(depth_path)?.to_luma16();
        let (width, height) = depth_image.dimensions();
        if width == 0 || height == 0 {
            return Err(SensorError::InitializationFailed(format!(
                "{} has no pixels",
                depth_path.display()
            )));
        }
        let depth = RawDepthFrame::from_u16(
            depth_image.as_raw(),
            width,
            height,
            range.min_reliable_mm(),
            range.max_reliable_mm(),
        );

        let color = match color_path {
            Some(path) => {
                let rgb = image::open(path)?.to_rgb8();
                if rgb.dimensions() != (width, height) {
                    warn!(
                        depth = ?(width, height),
                        color = ?rgb.dimensions(),
                        "Color image size differs from depth image"
                    );
                }
                Some(RawColorFrame {
                    width: rgb.width(),
                    height: rgb.height(),
                    rgb: rgb.into_raw(),
                })
            }
            None => None,
        };

        info!(
            path = %depth_path.display(),
            width,
            height,
            has_color = color.is_some(),
            "Loaded depth image"
        );

        Ok(Self {
            name: format!("File: {}", depth_path.display()),
            depth,
            color,
            color_sent: false,
            interval: frame_interval(frame_rate),
        })
    }
}

impl SensorSource for FileSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_interval(&self) -> Duration {
        self.interval
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.depth.width, self.depth.height)
    }

    fn next_depth(&mut self) -> Result<RawDepthFrame, SensorError> {
        Ok(self.depth.clone())
    }

    fn next_color(&mut self) -> Option<RawColorFrame> {
        if self.color_sent {
            return None;
        }
        self.color_sent = true;
        self.color.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb as ImageRgb};

    #[test]
    fn test_missing_file() {
        let result = FileSensor::open(
            Path::new("/nonexistent/depth.png"),
            None,
            DepthRange::Default,
            30,
        );
        assert!(matches!(result, Err(SensorError::NotFound)));
    }

    #[test]
    fn test_replays_png() {
        let dir = tempfile::tempdir().unwrap();
        let depth_path = dir.path().join("depth.png");
        let color_path = dir.path().join("color.png");

        let depth: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(4, 3, |x, y| Luma([1000 + (x + y * 4) as u16]));
        depth.save(&depth_path).unwrap();
        let color: ImageBuffer<ImageRgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(4, 3, ImageRgb([10, 20, 30]));
        color.save(&color_path).unwrap();

        let mut sensor =
            FileSensor::open(&depth_path, Some(&color_path), DepthRange::Near, 15).unwrap();

        assert_eq!(sensor.dimensions(), (4, 3));
        let frame = sensor.next_depth().unwrap();
        assert_eq!(frame.samples[5], 1005);
        assert_eq!((frame.min_reliable, frame.max_reliable), (400, 3000));
        assert_eq!(sensor.next_depth().unwrap(), frame);

        let color = sensor.next_color().unwrap();
        assert_eq!(&color.rgb[..3], &[10, 20, 30]);
        assert!(sensor.next_color().is_none());
    }
}
