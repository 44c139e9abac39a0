// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use depth_segmenter::Config;
use depth_segmenter::constants::{DEFAULT_HIGHLIGHT_COLOR, DEFAULT_TOLERANCE, DepthRange};
use depth_segmenter::errors::ConfigError;
use depth_segmenter::pipelines::segmentation::SegParams;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    assert_eq!(config.depth_range, DepthRange::Default);
    assert!(
        !config.use_camera_overlay,
        "Overlay should be off until a color frame is expected"
    );
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        tolerance: 120,
        highlight_color: [0, 160, 255],
        use_camera_overlay: true,
        depth_range: DepthRange::Near,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_invalid_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_params_from_config() {
    let config = Config {
        tolerance: 75,
        width: 320,
        height: 240,
        ..Config::default()
    };

    let params = SegParams::from_config(&config);

    assert_eq!(params.tolerance, 75);
    assert_eq!(params.seed, (160, 120));
    assert_eq!(params.highlight_color, DEFAULT_HIGHLIGHT_COLOR);
}
