// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────────┐     ┌──────────────┐
//! │ Depth Frame  │ ──▶ │  Segmentation Pipeline  │ ──▶ │ Display Sink │
//! │  (i16 mm)    │     │  - Clamp to range       │     │  (BGR32)     │
//! │              │     │  - Region growing       │     │              │
//! │ Color Frame  │ ──▶ │  - Compositing          │     │              │
//! └──────────────┘     └─────────────────────────┘     └──────────────┘
//! ```
//!
//! Frames arriving while one is in flight are dropped, so the display
//! always shows the newest result the pipeline could keep up with.
//!
//! # Modules
//!
//! - [`segmentation`]: Depth region segmentation and compositing

pub mod segmentation;
