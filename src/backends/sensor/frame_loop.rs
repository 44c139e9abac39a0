// SPDX-License-Identifier: GPL-3.0-only
//! Sensor capture loop
//!
//! A capture loop runs on its own thread and plays the part of the sensor's
//! frame-ready callback: it pulls frames from a [`SensorSource`] at the
//! source's frame rate and offers them to the [`PipelineController`], which
//! never blocks the loop.

use super::SensorSource;
use crate::pipelines::segmentation::PipelineController;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One source feeding one controller, paced against a fixed schedule
struct SensorPump {
    source: Box<dyn SensorSource>,
    controller: Arc<PipelineController>,
    interval: Duration,
    next_tick: Instant,
    frames: u64,
    max_frames: Option<u64>,
}

impl SensorPump {
    fn new(
        source: Box<dyn SensorSource>,
        controller: Arc<PipelineController>,
        max_frames: Option<u64>,
    ) -> Self {
        Self {
            interval: source.frame_interval(),
            source,
            controller,
            next_tick: Instant::now(),
            frames: 0,
            max_frames,
        }
    }

    fn finished(&self) -> bool {
        self.max_frames.is_some_and(|max| self.frames >= max)
    }

    /// Deliver one depth frame (and a color frame if one is due)
    ///
    /// A failed depth read still counts as a tick so a broken source cannot
    /// spin the loop.
    fn deliver(&mut self) {
        match self.source.next_depth() {
            Ok(frame) => {
                self.controller.submit_depth(&frame);
            }
            Err(e) => warn!(error = %e, "Depth read failed"),
        }
        if let Some(color) = self.source.next_color() {
            self.controller.update_camera(color);
        }
        self.frames += 1;
    }

    /// Sleep until the next tick; after a stall, restart the schedule
    /// rather than bursting to catch up
    fn wait_for_tick(&mut self) {
        self.next_tick += self.interval;
        let now = Instant::now();
        if self.next_tick > now {
            thread::sleep(self.next_tick - now);
        } else {
            self.next_tick = now;
        }
    }
}

/// Handle to a capture loop thread
pub struct CaptureLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl CaptureLoopController {
    /// Drive `source` into `controller` at the source's frame rate
    ///
    /// With `max_frames` set, the loop ends on its own after that many depth
    /// frames; otherwise it runs until stopped.
    pub fn start_sensor(
        source: Box<dyn SensorSource>,
        controller: Arc<PipelineController>,
        max_frames: Option<u64>,
    ) -> Self {
        let name = source.name().to_string();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&stop_signal);
        let mut pump = SensorPump::new(source, controller, max_frames);

        info!(name = %name, interval_us = pump.interval.as_micros() as u64, "Starting capture loop");

        let thread_name = name.clone();
        let thread_handle = thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) && !pump.finished() {
                pump.deliver();
                pump.wait_for_tick();
            }
            info!(name = %thread_name, frames = pump.frames, "Capture loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name,
        }
    }

    /// Get a clone of the stop signal, e.g. for a Ctrl+C handler
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        debug!(name = %self.name, "Requesting capture loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
        self.join();
    }

    /// Wait for the loop to end by itself (frame cap or external stop signal)
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take()
            && let Err(e) = handle.join()
        {
            warn!(name = %self.name, "Capture loop thread panicked: {:?}", e);
        }
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sensor::{RawColorFrame, RawDepthFrame, SyntheticSensor};
    use crate::constants::DepthRange;
    use crate::errors::SensorError;
    use crate::pipelines::segmentation::{LatestFrameSink, SegParams, SharedParams};

    /// Source whose depth reads always fail
    struct UnpluggedSensor;

    impl SensorSource for UnpluggedSensor {
        fn name(&self) -> &str {
            "unplugged"
        }

        fn frame_interval(&self) -> Duration {
            Duration::from_millis(1)
        }

        fn dimensions(&self) -> (u32, u32) {
            (2, 2)
        }

        fn next_depth(&mut self) -> Result<RawDepthFrame, SensorError> {
            Err(SensorError::NotFound)
        }

        fn next_color(&mut self) -> Option<RawColorFrame> {
            None
        }
    }

    fn pipeline() -> Arc<PipelineController> {
        let sink = Arc::new(LatestFrameSink::new());
        let params = Arc::new(SharedParams::new(SegParams::default().clamped_to(32, 24)));
        Arc::new(PipelineController::new(params, sink).unwrap())
    }

    #[test]
    fn test_frame_cap_ends_loop() {
        let pipeline = pipeline();
        let source = Box::new(SyntheticSensor::new(32, 24, 200, DepthRange::Default));

        let mut capture =
            CaptureLoopController::start_sensor(source, Arc::clone(&pipeline), Some(6));
        capture.join();

        let stats = pipeline.stats();
        assert_eq!(stats.submitted, 6);
        assert_eq!(stats.admitted + stats.dropped, 6);
        assert!(stats.admitted >= 1);
    }

    #[test]
    fn test_stop_signal_ends_uncapped_loop() {
        let pipeline = pipeline();
        let source = Box::new(SyntheticSensor::new(16, 12, 100, DepthRange::Default));

        let mut capture = CaptureLoopController::start_sensor(source, Arc::clone(&pipeline), None);
        thread::sleep(Duration::from_millis(50));
        capture.stop_signal().store(true, Ordering::SeqCst);
        capture.join();

        let submitted = pipeline.stats().submitted;
        assert!(submitted > 0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(pipeline.stats().submitted, submitted);
    }

    #[test]
    fn test_failed_reads_still_advance() {
        let pipeline = pipeline();
        let mut pump = SensorPump::new(Box::new(UnpluggedSensor), Arc::clone(&pipeline), Some(3));

        while !pump.finished() {
            pump.deliver();
        }

        assert_eq!(pump.frames, 3);
        assert_eq!(pipeline.stats().submitted, 0);
    }

    #[test]
    fn test_stall_restarts_schedule() {
        let mut pump = SensorPump::new(Box::new(UnpluggedSensor), pipeline(), None);
        pump.next_tick = Instant::now() - Duration::from_secs(1);

        let before = Instant::now();
        pump.wait_for_tick();

        assert!(pump.next_tick >= before);
    }
}
