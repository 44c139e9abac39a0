// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for depth capture
//!
//! The backend layer hides where frames come from, giving the pipeline one
//! API whether it is fed by a procedural scene or by recorded images:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Pipeline Controller             │
//! └────────────────────┬────────────────────────┘
//!                      │ submit_depth / update_camera
//! ┌────────────────────┴────────────────────────┐
//! │          Capture loop (own thread)           │
//! │  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │ SyntheticSensor │  │    FileSensor    │  │
//! │  └─────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`sensor`]: Sensor sources, frame types and the capture loop

pub mod sensor;
