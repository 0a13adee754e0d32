// Two-point calibration between domain and display coordinates

use crate::core::error::{Result, TelemetryError};
use crate::core::interpolate::lerp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Reference points as they appear in the configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub domain_a: Point,
    pub domain_b: Point,
    pub display_a: Point,
    pub display_b: Point,
}

/// Per-axis affine map fixed by two reference pairs.
///
/// Axes are calibrated independently: no rotation or shear.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    domain_a: Point,
    domain_b: Point,
    display_a: Point,
    display_b: Point,
}

impl CoordinateMapper {
    pub fn new(domain_a: Point, domain_b: Point, display_a: Point, display_b: Point) -> Result<Self> {
        if domain_a.x == domain_b.x || domain_a.y == domain_b.y {
            return Err(TelemetryError::DegenerateCalibration(format!(
                "domain references coincide on an axis: {:?} / {:?}",
                domain_a, domain_b
            )));
        }
        if display_a.x == display_b.x || display_a.y == display_b.y {
            return Err(TelemetryError::DegenerateCalibration(format!(
                "display references coincide on an axis: {:?} / {:?}",
                display_a, display_b
            )));
        }
        Ok(Self {
            domain_a,
            domain_b,
            display_a,
            display_b,
        })
    }

    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        Self::new(config.domain_a, config.domain_b, config.display_a, config.display_b)
    }

    pub fn map(&self, point: Point) -> Point {
        let t_x = (point.x - self.domain_a.x) / (self.domain_b.x - self.domain_a.x);
        let t_y = (point.y - self.domain_a.y) / (self.domain_b.y - self.domain_a.y);
        Point::new(
            lerp(t_x, self.display_a.x, self.display_b.x),
            lerp(t_y, self.display_a.y, self.display_b.y),
        )
    }

    pub fn scale(&self) -> ScaleMapper {
        ScaleMapper {
            display_per_domain: self.display_a.distance(&self.display_b) / self.domain_a.distance(&self.domain_b),
        }
    }
}

/// Uniform display-units-per-domain-unit factor, for radius-like lengths.
#[derive(Debug, Clone, Copy)]
pub struct ScaleMapper {
    display_per_domain: f64,
}

impl ScaleMapper {
    pub fn display_per_domain(&self) -> f64 {
        self.display_per_domain
    }

    pub fn to_display(&self, domain_length: f64) -> f64 {
        domain_length * self.display_per_domain
    }
}
