// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame orchestration
//!
//! The producer (sensor callback or capture loop) calls
//! [`PipelineController::submit_depth`], which either drops the frame or
//! hands a private copy of it to the worker thread and returns at once. The
//! worker snapshots the parameters, preprocesses, grows the region,
//! composites, publishes and finally releases the frame gate.

use super::composite::{OutputBuffer, composite};
use super::gate::{Admission, FrameGate};
use super::grid::CameraGrid;
use super::params::{SegParams, SharedParams};
use super::preprocess;
use super::region;
use crate::backends::sensor::{RawColorFrame, RawDepthFrame};
use crate::errors::{AppError, AppResult, PipelineError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Receiver of composited frames
///
/// Implementations present the buffer and may coalesce or skip frames; that
/// never affects pipeline state.
pub trait DisplaySink: Send + Sync {
    fn publish(&self, buffer: &OutputBuffer);
}

/// Result of offering one frame to the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Another frame was in flight; this one was discarded
    Dropped,
    /// Frame processed and handed to the sink
    Published,
    /// Frame aborted; the sink keeps showing the previous buffer
    Failed(PipelineError),
}

/// Frame counters
#[derive(Debug, Default)]
struct PipelineStats {
    submitted: AtomicU64,
    admitted: AtomicU64,
    dropped: AtomicU64,
    published: AtomicU64,
    failed: AtomicU64,
    last_process_us: AtomicU64,
}

/// Point-in-time copy of the frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStatsSnapshot {
    pub submitted: u64,
    pub admitted: u64,
    pub dropped: u64,
    pub published: u64,
    pub failed: u64,
    /// Processing time of the most recent frame in microseconds
    pub last_process_us: u64,
}

/// State shared between the producer side and the worker thread
struct Shared {
    gate: Arc<FrameGate>,
    params: Arc<SharedParams>,
    /// Most recent color frame; may lag the depth stream
    camera: Mutex<Option<Arc<CameraGrid>>>,
    sink: Arc<dyn DisplaySink>,
    stats: PipelineStats,
}

impl Shared {
    fn latest_camera(&self) -> Option<Arc<CameraGrid>> {
        self.camera.lock().ok()?.clone()
    }

    /// Run one admitted frame to completion
    ///
    /// `_admission` is dropped on return, after publishing, which releases
    /// the gate on every path.
    fn process(&self, frame: RawDepthFrame, _admission: Admission) -> FrameOutcome {
        let start = Instant::now();
        let params = self.params.snapshot();

        let outcome = match self.render(frame, params) {
            Ok(buffer) => {
                self.sink.publish(&buffer);
                self.stats.published.fetch_add(1, Ordering::Relaxed);
                FrameOutcome::Published
            }
            Err(e) => {
                warn!(error = %e, "Frame aborted");
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                FrameOutcome::Failed(e)
            }
        };

        let elapsed = start.elapsed();
        self.stats
            .last_process_us
            .store(elapsed.as_micros() as u64, Ordering::Relaxed);
        trace!(process_us = elapsed.as_micros() as u64, "Frame processed");

        outcome
    }

    fn render(&self, frame: RawDepthFrame, params: SegParams) -> Result<OutputBuffer, PipelineError> {
        let grid = preprocess::prepare(
            frame.samples,
            frame.width,
            frame.height,
            frame.min_reliable,
            frame.max_reliable,
        )?;

        let params = params.clamped_to(grid.width(), grid.height());
        let membership = region::grow(&grid, params.seed, params.tolerance);

        let camera = if params.use_camera_overlay {
            self.latest_camera()
        } else {
            None
        };

        composite(
            &grid,
            &membership,
            camera.as_deref(),
            params.highlight_color,
            params.seed,
        )
    }
}

/// Work handed from the producer to the worker thread
struct WorkItem {
    frame: RawDepthFrame,
    admission: Admission,
}

/// Orchestrates the segmentation pipeline for a stream of depth frames
pub struct PipelineController {
    shared: Arc<Shared>,
    worker_tx: Option<Sender<WorkItem>>,
    worker: Option<JoinHandle<()>>,
}

impl PipelineController {
    /// Create a controller and start its worker thread
    pub fn new(params: Arc<SharedParams>, sink: Arc<dyn DisplaySink>) -> AppResult<Self> {
        let shared = Arc::new(Shared {
            gate: Arc::new(FrameGate::new()),
            params,
            camera: Mutex::new(None),
            sink,
            stats: PipelineStats::default(),
        });

        let (worker_tx, worker_rx) = mpsc::channel::<WorkItem>();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("segmentation-worker".to_string())
            .spawn(move || {
                debug!("Segmentation worker started");
                for item in worker_rx {
                    worker_shared.process(item.frame, item.admission);
                }
                debug!("Segmentation worker exiting");
            })
            .map_err(|e| AppError::Other(format!("Failed to spawn worker: {}", e)))?;

        info!("Pipeline controller started");

        Ok(Self {
            shared,
            worker_tx: Some(worker_tx),
            worker: Some(worker),
        })
    }

    /// Offer a depth frame from the producer context
    ///
    /// Never blocks. Returns `true` if the frame was admitted and handed to
    /// the worker, `false` if it was dropped because a frame is in flight.
    pub fn submit_depth(&self, frame: &RawDepthFrame) -> bool {
        self.shared.stats.submitted.fetch_add(1, Ordering::Relaxed);

        let Some(admission) = self.shared.gate.try_enter() else {
            self.shared.stats.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Frame in flight, dropping depth frame");
            return false;
        };
        self.shared.stats.admitted.fetch_add(1, Ordering::Relaxed);

        let item = WorkItem {
            frame: frame.clone(),
            admission,
        };
        match &self.worker_tx {
            Some(tx) => {
                if tx.send(item).is_err() {
                    // Item (and its admission) dropped here, gate released
                    warn!("Segmentation worker is gone, frame lost");
                    self.shared.stats.failed.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                true
            }
            None => {
                self.shared.stats.failed.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Admit and process a frame on the calling thread
    pub fn run_frame(&self, frame: &RawDepthFrame) -> FrameOutcome {
        self.shared.stats.submitted.fetch_add(1, Ordering::Relaxed);

        let Some(admission) = self.shared.gate.try_enter() else {
            self.shared.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return FrameOutcome::Dropped;
        };
        self.shared.stats.admitted.fetch_add(1, Ordering::Relaxed);

        self.shared.process(frame.clone(), admission)
    }

    /// Store the latest color frame for overlay compositing
    pub fn update_camera(&self, frame: RawColorFrame) {
        match CameraGrid::from_rgb_bytes(frame.width, frame.height, &frame.rgb) {
            Ok(grid) => {
                if let Ok(mut guard) = self.shared.camera.lock() {
                    *guard = Some(Arc::new(grid));
                }
            }
            Err(e) => warn!(error = %e, "Ignoring malformed color frame"),
        }
    }

    /// Parameters shared with input handlers
    pub fn params(&self) -> Arc<SharedParams> {
        Arc::clone(&self.shared.params)
    }

    /// Admission gate, exposed for diagnostics
    pub fn gate(&self) -> Arc<FrameGate> {
        Arc::clone(&self.shared.gate)
    }

    pub fn stats(&self) -> PipelineStatsSnapshot {
        let s = &self.shared.stats;
        PipelineStatsSnapshot {
            submitted: s.submitted.load(Ordering::Relaxed),
            admitted: s.admitted.load(Ordering::Relaxed),
            dropped: s.dropped.load(Ordering::Relaxed),
            published: s.published.load(Ordering::Relaxed),
            failed: s.failed.load(Ordering::Relaxed),
            last_process_us: s.last_process_us.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting frames and wait for the worker to finish its current one
    pub fn shutdown(&mut self) {
        self.worker_tx.take();
        if let Some(handle) = self.worker.take() {
            if let Err(e) = handle.join() {
                warn!("Segmentation worker panicked: {:?}", e);
            } else {
                info!("Pipeline controller stopped");
            }
        }
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
