// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands that run without the terminal viewer
//!
//! This module provides command-line functionality for:
//! - Opening the configured sensor source
//! - Headless runs that print pipeline statistics
//! - Showing and saving the configuration

use depth_segmenter::Config;
use depth_segmenter::backends::sensor::{
    CaptureLoopController, FileSensor, SensorSource, SyntheticSensor,
};
use depth_segmenter::pipelines::segmentation::{
    LatestFrameSink, OutputBuffer, PipelineController, SegParams, SharedParams, bytes_to_colors,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

/// Parse a seed given as `X,Y`
pub fn parse_seed(value: &str) -> Result<(u32, u32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{}'", value))?;
    let x = x.trim().parse().map_err(|e| format!("invalid X: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("invalid Y: {}", e))?;
    Ok((x, y))
}

/// Open the file source if a depth image was given, else the synthetic sensor
pub fn open_source(
    config: &Config,
    depth: Option<&Path>,
    color: Option<&Path>,
) -> Result<Box<dyn SensorSource>, Box<dyn std::error::Error>> {
    let source: Box<dyn SensorSource> = match depth {
        Some(path) => Box::new(FileSensor::open(
            path,
            color,
            config.depth_range,
            config.frame_rate,
        )?),
        None => Box::new(SyntheticSensor::new(
            config.width,
            config.height,
            config.frame_rate,
            config.depth_range,
        )),
    };
    info!(source = source.name(), range = config.depth_range.display_name(), "Opened depth source");
    Ok(source)
}

/// Feed `frames` depth frames through the pipeline and report what happened
pub fn run_headless(
    source: Box<dyn SensorSource>,
    config: &Config,
    frames: u64,
    seed: Option<(u32, u32)>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = source.dimensions();
    let (seed_x, seed_y) = seed.unwrap_or((width / 2, height / 2));

    let sink = Arc::new(LatestFrameSink::new());
    let params = Arc::new(SharedParams::new(
        SegParams::from_config(config)
            .with_seed(seed_x, seed_y)
            .clamped_to(width, height),
    ));
    let pipeline = Arc::new(PipelineController::new(Arc::clone(&params), sink.clone())?);

    println!("Source: {} ({}x{})", source.name(), width, height);
    println!("Processing {} frames...", frames);

    let mut capture = CaptureLoopController::start_sensor(source, Arc::clone(&pipeline), Some(frames));

    // Ctrl+C stops early but still prints the summary
    let stop = capture.stop_signal();
    if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
        warn!(error = %e, "Could not install Ctrl+C handler");
    }
    capture.join();

    // The capture thread is gone, so this is the last reference; shutting
    // down lets the worker finish its in-flight frame
    let stats = match Arc::try_unwrap(pipeline) {
        Ok(mut pipeline) => {
            pipeline.shutdown();
            pipeline.stats()
        }
        Err(pipeline) => pipeline.stats(),
    };

    let p = params.snapshot();
    println!();
    println!("Seed:       ({}, {})", p.seed.0, p.seed.1);
    println!("Tolerance:  {} mm", p.tolerance);
    println!("Submitted:  {}", stats.submitted);
    println!("Admitted:   {}", stats.admitted);
    println!("Dropped:    {}", stats.dropped);
    println!("Published:  {}", stats.published);
    println!("Failed:     {}", stats.failed);
    println!(
        "Last frame: {:.2} ms",
        stats.last_process_us as f64 / 1000.0
    );

    if let Some(path) = output {
        let frame = sink.latest().ok_or("No frame was published")?;
        save_png(&frame, path)?;
        println!("Saved:      {}", path.display());
    }

    Ok(())
}

/// Write a composited frame as an RGB PNG
fn save_png(frame: &OutputBuffer, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rgb: Vec<u8> = bytes_to_colors(&frame.bytes)?
        .into_iter()
        .flat_map(|c| [c.r, c.g, c.b])
        .collect();

    let img: image::RgbImage = image::ImageBuffer::from_raw(frame.width, frame.height, rgb)
        .ok_or("Output buffer does not match its dimensions")?;
    img.save(path)?;
    info!(path = %path.display(), "Frame saved");
    Ok(())
}

/// Print the effective configuration, optionally saving it
pub fn show_config(config: &Config, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        let path = config.save()?;
        println!("Saved to {}", path.display());
    } else if let Ok(path) = Config::default_path() {
        println!("Config file: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("320,240"), Ok((320, 240)));
        assert_eq!(parse_seed(" 1 , 2 "), Ok((1, 2)));
        assert!(parse_seed("320").is_err());
        assert!(parse_seed("a,2").is_err());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let frame = OutputBuffer {
            bytes: vec![3, 2, 1, 0, 30, 20, 10, 0],
            width: 2,
            height: 1,
        };

        save_png(&frame, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3]);
        assert_eq!(img.get_pixel(1, 0).0, [10, 20, 30]);
    }
}
