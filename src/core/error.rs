// Error handling for the telemetry engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed series '{series}': {reason}")]
    MalformedSeries { series: String, reason: String },

    #[error("Degenerate interval at t={timestamp}: no non-zero neighbouring interval")]
    DegenerateInterval { timestamp: f64 },

    #[error("Degenerate calibration: {0}")]
    DegenerateCalibration(String),

    #[error("Time {time} outside series range [{first}, {last}]")]
    OutOfRangeTime { time: f64, first: f64, last: f64 },

    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    #[error("Channel '{channel}' not found in series '{series}'")]
    ChannelNotFound { series: String, channel: String },

    #[error("Calibration not found: {0}")]
    CalibrationNotFound(String),

    #[error("Readout not found: {0}")]
    ReadoutNotFound(String),

    #[error("Cannot convert {from} to {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TelemetryError {
    pub fn malformed(series: &str, reason: impl Into<String>) -> Self {
        TelemetryError::MalformedSeries {
            series: series.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors that per-frame computation recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TelemetryError::DegenerateInterval { .. } | TelemetryError::OutOfRangeTime { .. }
        )
    }
}
