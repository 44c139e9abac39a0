// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensor sources
//!
//! A [`SensorSource`] delivers raw depth frames at the sensor's frame rate
//! and, independently, color frames at its own cadence. Sources here stand
//! in for device backends:
//!
//! - [`SyntheticSensor`]: procedural scene with a moving object
//! - [`FileSensor`]: replays a 16-bit depth PNG and optional color image
//!
//! [`CaptureLoopController`] drives a source on its own thread and feeds
//! the pipeline controller.

mod file_source;
mod frame_loop;
mod synthetic;
mod types;

pub use file_source::FileSensor;
pub use frame_loop::CaptureLoopController;
pub use synthetic::SyntheticSensor;
pub use types::{RawColorFrame, RawDepthFrame};

use crate::errors::SensorError;
use std::time::Duration;

/// A source of depth (and optionally color) frames
pub trait SensorSource: Send {
    /// Human readable source name for logging and the status bar
    fn name(&self) -> &str;

    /// Interval between depth frames
    fn frame_interval(&self) -> Duration;

    /// Depth frame dimensions
    fn dimensions(&self) -> (u32, u32);

    /// Acquire the next depth frame
    fn next_depth(&mut self) -> Result<RawDepthFrame, SensorError>;

    /// Acquire a color frame if one is due at this tick
    fn next_color(&mut self) -> Option<RawColorFrame>;
}
