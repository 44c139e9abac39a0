// SPDX-License-Identifier: MPL-2.0

//! Error types for the depth segmentation pipeline

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Per-frame pipeline errors
    Pipeline(PipelineError),
    /// Sensor source errors
    Sensor(SensorError),
    /// Configuration errors
    Config(ConfigError),
    /// Generic error with message
    Other(String),
}

/// Errors contained to a single frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Camera grid dimensions disagree with the depth grid
    DimensionMismatch {
        depth: (u32, u32),
        camera: (u32, u32),
    },
    /// Sample count does not match the declared frame dimensions
    MalformedFrame {
        width: u32,
        height: u32,
        samples: usize,
    },
    /// Packed pixel buffer length is not a whole number of pixels
    InvalidPixelBuffer(usize),
}

/// Sensor source errors
#[derive(Debug, Clone)]
pub enum SensorError {
    /// No sensor available
    NotFound,
    /// Sensor could not be opened or started
    InitializationFailed(String),
    /// I/O failure while reading frames
    Io(String),
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// No configuration directory on this system
    NoConfigDir,
    /// Config file exists but could not be parsed
    Parse(String),
    /// Reading or writing the config file failed
    Io(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Pipeline(e) => write!(f, "Pipeline error: {}", e),
            AppError::Sensor(e) => write!(f, "Sensor error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::DimensionMismatch { depth, camera } => write!(
                f,
                "Dimension mismatch: depth {}x{}, camera {}x{}",
                depth.0, depth.1, camera.0, camera.1
            ),
            PipelineError::MalformedFrame {
                width,
                height,
                samples,
            } => write!(
                f,
                "Malformed frame: {}x{} declared, {} samples received",
                width, height, samples
            ),
            PipelineError::InvalidPixelBuffer(len) => {
                write!(f, "Invalid pixel buffer: {} bytes is not a multiple of 4", len)
            }
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::NotFound => write!(f, "No depth sensor ready"),
            SensorError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            SensorError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "No configuration directory available"),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Io(msg) => write!(f, "Config I/O error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PipelineError {}
impl std::error::Error for SensorError {}
impl std::error::Error for ConfigError {}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<SensorError> for AppError {
    fn from(err: SensorError) -> Self {
        AppError::Sensor(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<image::ImageError> for SensorError {
    fn from(err: image::ImageError) -> Self {
        SensorError::Io(err.to_string())
    }
}
