use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::core::calibration::CalibrationConfig;
use crate::core::clock::SubWindow;
use crate::core::constants::{CompressionType, MIN_COURSE_GROUND_SPEED};
use crate::core::format::ChannelMetadata;
use crate::core::interpolate::OverrideEntry;
use crate::core::mission_clock::MissionClockConfig;
use crate::core::projector::ProjectorConfig;
use crate::core::units::{Thermistor, Unit};

#[derive(Debug, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub name: String,
    pub frame_rate: f64,
    pub total_duration: f64,
    #[serde(default)]
    pub window: Option<SubWindow>,
    pub series: Vec<SeriesConfig>,
    #[serde(default)]
    pub calibrations: BTreeMap<String, CalibrationConfig>,
    #[serde(default)]
    pub projector: Option<ProjectorConfig>,
    #[serde(default)]
    pub readouts: Vec<ReadoutConfig>,
    #[serde(default)]
    pub flags: Vec<FlagConfig>,
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
    #[serde(default)]
    pub overrides: Vec<OverrideConfig>,
    #[serde(default)]
    pub mission_clock: Option<MissionClockConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesFormat {
    /// Flat JSON array of numbers and booleans.
    #[default]
    Json,
    /// Raw little-endian f64.
    F64le,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    pub path: PathBuf,
    /// Channels after the timestamp, in record order.
    pub channels: Vec<ChannelMetadata>,
    #[serde(default)]
    pub format: SeriesFormat,
    /// Inferred from the file extension when absent.
    #[serde(default)]
    pub compression: Option<CompressionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Quantity {
    Value {
        series: String,
        channel: String,
    },
    Rate {
        series: String,
        channel: String,
    },
    /// `hypot(x, y)` of values, or of rates when `rate` is set.
    Magnitude {
        series: String,
        x: String,
        y: String,
        #[serde(default)]
        rate: bool,
    },
    /// Course over ground in degrees, `[0, 360)`.
    Heading {
        series: String,
        north: String,
        east: String,
        #[serde(default = "default_min_speed")]
        min_speed: f64,
    },
    Thermistor {
        series: String,
        channel: String,
        coefficients: Thermistor,
    },
}

fn default_min_speed() -> f64 {
    MIN_COURSE_GROUND_SPEED
}

impl Quantity {
    pub fn series(&self) -> &str {
        match self {
            Quantity::Value { series, .. }
            | Quantity::Rate { series, .. }
            | Quantity::Magnitude { series, .. }
            | Quantity::Heading { series, .. }
            | Quantity::Thermistor { series, .. } => series,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadoutConfig {
    pub name: String,
    pub quantity: Quantity,
    pub unit: Unit,
    #[serde(default)]
    pub display: Vec<Unit>,
    #[serde(default)]
    pub scale: Option<ColorScale>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagConfig {
    pub name: String,
    pub series: String,
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerSource {
    /// Interpolated `(x, y)` channels, e.g. east/north meters.
    Planar { series: String, x: String, y: String },
    /// Frame time against a readout, e.g. the altitude graph dot.
    TimeValue { readout: String },
    Projector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusConfig {
    pub domain_length: f64,
    pub calibration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub name: String,
    pub source: MarkerSource,
    pub calibration: String,
    #[serde(default)]
    pub radius: Option<RadiusConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSampling {
    /// Push every frame.
    #[default]
    Frame,
    /// Push once per record of the readout's series.
    Record,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub name: String,
    pub readout: String,
    pub duration_seconds: f64,
    #[serde(default)]
    pub sampling: ChartSampling,
    /// Pushes per second; the frame rate when sampling every frame.
    #[serde(default)]
    pub sample_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideConfig {
    pub series: String,
    pub channel: String,
    pub entries: Vec<OverrideEntry>,
}
