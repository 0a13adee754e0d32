// Closed-form motion of a secondary reference point

use crate::core::calibration::Point;
use crate::core::constants::PROJECTOR_SECONDS_PER_UNIT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Domain units per minute.
    pub speed: f64,
    pub angle_degrees: f64,
    pub offset_lat: f64,
    pub offset_lon: f64,
    /// Minutes added to `time / 60`.
    pub temporal_offset: f64,
}

/// Straight-line track: `lat = v·cos(θ)·t' + lat0`, `lon = v·sin(θ)·t' + lon0`
/// with `t' = time / 60 + temporal_offset`.
#[derive(Debug, Clone, Copy)]
pub struct KinematicProjector {
    velocity_lat: f64,
    velocity_lon: f64,
    offset: Point,
    temporal_offset: f64,
}

impl KinematicProjector {
    pub fn new(config: &ProjectorConfig) -> Self {
        let angle = config.angle_degrees.to_radians();
        Self {
            velocity_lat: config.speed * angle.cos(),
            velocity_lon: config.speed * angle.sin(),
            offset: Point::new(config.offset_lat, config.offset_lon),
            temporal_offset: config.temporal_offset,
        }
    }

    /// `(lat, lon)` at `time` seconds.
    pub fn position_at(&self, time: f64) -> Point {
        let t = time / PROJECTOR_SECONDS_PER_UNIT + self.temporal_offset;
        Point::new(
            self.velocity_lat * t + self.offset.x,
            self.velocity_lon * t + self.offset.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eclipse_2024() -> ProjectorConfig {
        ProjectorConfig {
            speed: 0.485,
            angle_degrees: 62.6,
            offset_lat: 11.7,
            offset_lon: -134.95,
            temporal_offset: -82.9,
        }
    }

    #[test]
    fn test_offset_at_reference_time() {
        let projector = KinematicProjector::new(&eclipse_2024());
        // t' == 0 when time / 60 == 82.9
        let p = projector.position_at(82.9 * 60.0);
        assert!((p.x - 11.7).abs() < 1e-9);
        assert!((p.y + 134.95).abs() < 1e-9);
    }

    #[test]
    fn test_moves_along_heading() {
        let projector = KinematicProjector::new(&eclipse_2024());
        let a = projector.position_at(6000.0);
        let b = projector.position_at(6060.0);
        let angle = 62.6f64.to_radians();
        assert!((a.distance(&b) - 0.485).abs() < 1e-9);
        assert!(((b.x - a.x) - 0.485 * angle.cos()).abs() < 1e-9);
        assert!(b.y > a.y);
    }
}
