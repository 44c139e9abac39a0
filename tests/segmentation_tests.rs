// SPDX-License-Identifier: MPL-2.0

//! End-to-end tests for the segmentation pipeline

use depth_segmenter::backends::sensor::{RawColorFrame, RawDepthFrame};
use depth_segmenter::constants::{
    NO_DATA_COLOR, REJECTED_COLOR, SEED_MARKER_COLOR,
};
use depth_segmenter::errors::PipelineError;
use depth_segmenter::pipelines::segmentation::{
    CameraGrid, DepthGrid, FrameGate, FrameOutcome, LatestFrameSink, Membership, MembershipGrid,
    PipelineController, Rgb, SegParams, SharedParams, composite, grow, preprocess,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

fn depth_frame(width: u32, height: u32, samples: Vec<i16>) -> RawDepthFrame {
    RawDepthFrame {
        samples,
        width,
        height,
        min_reliable: 50,
        max_reliable: 4000,
    }
}

#[test]
fn test_outlier_excluded_from_region() {
    let mut samples = vec![100i16; 16];
    samples[2 * 4 + 2] = 5000;
    let grid = DepthGrid::new(4, 4, samples, 0, i16::MAX).unwrap();

    let membership = grow(&grid, (0, 0), 50);

    assert_eq!(membership.get(2, 2), Membership::RejectedBoundary);
    assert_eq!(membership.member_count(), 15);
}

#[test]
fn test_no_data_cell_is_boundary() {
    // Zero right next to the seed, rest of the row reachable only through it
    let grid = DepthGrid::new(4, 1, vec![1000, 0, 1000, 1000], 0, i16::MAX).unwrap();

    let membership = grow(&grid, (0, 0), 50);

    assert_eq!(membership.get(1, 0), Membership::RejectedBoundary);
    assert_eq!(membership.get(2, 0), Membership::Unvisited);
    assert_eq!(membership.get(3, 0), Membership::Unvisited);
}

#[test]
fn test_out_of_range_depth_cannot_join() {
    // 5000 is above the reliable range and becomes the far sentinel, so
    // even an enormous tolerance cannot pull it in
    let grid = preprocess::prepare(vec![3990, 4000, 5000], 3, 1, 800, 4000).unwrap();

    let membership = grow(&grid, (0, 0), u32::MAX);

    assert_eq!(membership.get(1, 0), Membership::Member);
    assert_eq!(membership.get(2, 0), Membership::RejectedBoundary);
}

#[test]
fn test_camera_dimension_mismatch() {
    let grid = DepthGrid::filled(640, 480, 1000);
    let membership = MembershipGrid::new(640, 480);
    let camera = CameraGrid::new(320, 240, vec![Rgb::default(); 320 * 240]).unwrap();

    let result = composite(&grid, &membership, Some(&camera), Rgb::new(255, 0, 0), (0, 0));

    assert_eq!(
        result,
        Err(PipelineError::DimensionMismatch {
            depth: (640, 480),
            camera: (320, 240),
        })
    );
}

#[test]
fn test_full_frame_depth_view() {
    let sink = Arc::new(LatestFrameSink::new());
    let params = Arc::new(SharedParams::new(SegParams::default().with_seed(0, 0)));
    let controller = PipelineController::new(Arc::clone(&params), sink.clone()).unwrap();

    // Two surfaces split by a dropout column; the far one is out of range
    #[rustfmt::skip]
    let samples = vec![
        1000, 1010, 0, 2000,
        1005, 1015, 0, 9000,
    ];
    let outcome = controller.run_frame(&depth_frame(4, 2, samples));
    assert_eq!(outcome, FrameOutcome::Published);

    let out = sink.latest().unwrap();
    assert_eq!(out.stride(), 16);
    assert_eq!(out.pixel(0, 0), SEED_MARKER_COLOR);
    assert_eq!(out.pixel(1, 1), params.snapshot().highlight_color);
    assert_eq!(out.pixel(2, 0), REJECTED_COLOR);
    // Never reached: grayscale of the low byte, or green for no data
    assert_eq!(out.pixel(3, 0), Rgb::gray(2000u16 as u8));
    assert_eq!(out.pixel(3, 1), Rgb::gray(i16::MAX as u8));
    assert_ne!(out.pixel(3, 0), NO_DATA_COLOR);
}

#[test]
fn test_overlay_mismatch_keeps_last_frame() {
    let sink = Arc::new(LatestFrameSink::new());
    let params = Arc::new(SharedParams::new(SegParams::default()));
    let controller = PipelineController::new(Arc::clone(&params), sink.clone()).unwrap();

    controller.run_frame(&depth_frame(4, 4, vec![1000; 16]));
    let shown = sink.latest().unwrap();
    let generation = sink.generation();

    params.set_overlay(true);
    controller.update_camera(RawColorFrame {
        rgb: vec![0; 2 * 2 * 3],
        width: 2,
        height: 2,
    });
    let outcome = controller.run_frame(&depth_frame(4, 4, vec![1000; 16]));

    assert!(matches!(
        outcome,
        FrameOutcome::Failed(PipelineError::DimensionMismatch { .. })
    ));
    assert_eq!(sink.generation(), generation);
    assert_eq!(sink.latest().unwrap(), shown);

    // The gate was released, so the next well-formed frame goes through
    params.set_overlay(false);
    assert_eq!(
        controller.run_frame(&depth_frame(4, 4, vec![1000; 16])),
        FrameOutcome::Published
    );
}

#[test]
fn test_gate_single_flight_under_contention() {
    let gate = Arc::new(FrameGate::new());
    let active = Arc::new(AtomicUsize::new(0));
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let active = Arc::clone(&active);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                for _ in 0..1000 {
                    if let Some(_admission) = gate.try_enter() {
                        let concurrent = active.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(concurrent, 0, "two frames in flight");
                        admitted.fetch_add(1, Ordering::SeqCst);
                        active.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(admitted.load(Ordering::SeqCst) > 0);
    assert!(!gate.is_busy());
}
