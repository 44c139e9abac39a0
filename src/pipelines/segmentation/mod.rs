// SPDX-License-Identifier: GPL-3.0-only

//! Depth segmentation pipeline
//!
//! Each admitted depth frame flows through fresh, stage-owned grids:
//!
//! ```text
//! RawDepthFrame -> preprocess -> DepthGrid -> region::grow -> MembershipGrid
//!                                    \______________________/
//!                                               |
//!                             composite (+ optional CameraGrid) -> OutputBuffer
//! ```
//!
//! [`FrameGate`] keeps at most one frame in flight, so none of the stages
//! need locking. [`SharedParams`] is the only state shared with input
//! handlers and is read once per frame.

pub mod composite;
pub mod controller;
pub mod gate;
pub mod grid;
pub mod params;
pub mod preprocess;
pub mod region;
pub mod sink;

pub use composite::{OutputBuffer, bytes_to_colors, colors_to_bytes, composite};
pub use controller::{DisplaySink, FrameOutcome, PipelineController, PipelineStatsSnapshot};
pub use gate::{Admission, FrameGate};
pub use grid::{CameraGrid, DepthGrid, Membership, MembershipGrid, Rgb};
pub use params::{SegParams, SharedParams};
pub use region::grow;
pub use sink::LatestFrameSink;
