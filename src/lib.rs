// SPDX-License-Identifier: MPL-2.0

//! Depth Segmenter - interactive region segmentation for depth sensors
//!
//! Picks out the surface under a user-chosen seed point in a live depth
//! stream, grows it across neighbors of similar depth, and renders the
//! result over either a depth visualization or the color camera image.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Depth sensor sources and the capture loop
//! - [`pipelines`]: The per-frame segmentation pipeline
//! - [`terminal`]: Interactive terminal viewer
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use depth_segmenter::backends::sensor::{SensorSource, SyntheticSensor};
//! use depth_segmenter::constants::DepthRange;
//! use depth_segmenter::pipelines::segmentation::{
//!     FrameOutcome, LatestFrameSink, PipelineController, SegParams, SharedParams,
//! };
//! use std::sync::Arc;
//!
//! let sink = Arc::new(LatestFrameSink::new());
//! let params = Arc::new(SharedParams::new(SegParams::default()));
//! let controller = PipelineController::new(params, sink.clone()).unwrap();
//!
//! let mut sensor = SyntheticSensor::new(640, 480, 30, DepthRange::Default);
//! let frame = sensor.next_depth().unwrap();
//! assert_eq!(controller.run_frame(&frame), FrameOutcome::Published);
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod terminal;

// Re-export commonly used types
pub use config::Config;
pub use constants::DepthRange;
pub use errors::{AppError, AppResult};
