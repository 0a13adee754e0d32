use serde::Serialize;
use std::collections::VecDeque;

use crate::core::calibration::Point;
use crate::core::units::Unit;

/// Everything the renderer needs for one frame.
///
/// Borrows the engine's chart buffers, so it must be dropped before the
/// next frame is requested.
#[derive(Debug, Serialize)]
pub struct FrameSnapshot<'a> {
    pub index: u64,
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_clock: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission_elapsed: Option<String>,
    pub readouts: Vec<Readout<'a>>,
    pub flags: Vec<Flag<'a>>,
    pub markers: Vec<Marker<'a>>,
    pub charts: Vec<ChartTrace<'a>>,
    /// Series whose range does not cover this frame; their values are clamped.
    pub out_of_range: Vec<&'a str>,
}

impl<'a> FrameSnapshot<'a> {
    pub fn readout(&self, name: &str) -> Option<&Readout<'a>> {
        self.readouts.iter().find(|r| r.name == name)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|f| f.name == name).map(|f| f.on)
    }

    pub fn marker(&self, name: &str) -> Option<&Marker<'a>> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn chart(&self, name: &str) -> Option<&ChartTrace<'a>> {
        self.charts.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Serialize)]
pub struct Readout<'a> {
    pub name: &'a str,
    pub unit: Unit,
    /// None when the quantity is undefined this frame (e.g. course at rest).
    pub value: Option<f64>,
    pub converted: Vec<Converted>,
    /// Position on the configured color scale, unclamped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_position: Option<f64>,
}

impl Readout<'_> {
    pub fn in_unit(&self, unit: Unit) -> Option<f64> {
        self.converted.iter().find(|c| c.unit == unit).map(|c| c.value)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Converted {
    pub unit: Unit,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct Flag<'a> {
    pub name: &'a str,
    pub on: bool,
}

#[derive(Debug, Serialize)]
pub struct Marker<'a> {
    pub name: &'a str,
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ChartTrace<'a> {
    pub name: &'a str,
    /// Oldest first, one entry per sample. Samples taken while the readout
    /// was undefined are NaN (serialized as `null`).
    pub values: &'a VecDeque<f64>,
    /// Seconds since the newest value was pushed.
    pub latest_age: Option<f64>,
}
