// Wall-clock and mission-elapsed labels

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MissionClockConfig {
    /// Timeline seconds at release.
    pub release_time: f64,
    /// Local time of day at release, e.g. `"12:02:12"`.
    pub release_wall_clock: NaiveTime,
}

/// Converts timeline seconds into `HH:MM:SS` and `L±HH:MM:SS` labels.
///
/// Fractional seconds are truncated toward the release.
#[derive(Debug, Clone, Copy)]
pub struct MissionClock {
    release_time: f64,
    release_wall_clock: NaiveTime,
}

impl MissionClock {
    pub fn new(config: &MissionClockConfig) -> Self {
        Self {
            release_time: config.release_time,
            release_wall_clock: config.release_wall_clock,
        }
    }

    fn elapsed(&self, time: f64) -> (bool, TimeDelta) {
        let relative = time - self.release_time;
        let whole = relative.abs().floor() as i64;
        (relative < 0.0, TimeDelta::seconds(whole))
    }

    pub fn wall_clock(&self, time: f64) -> String {
        let (before, delta) = self.elapsed(time);
        let delta = if before { -delta } else { delta };
        let (now, _) = self.release_wall_clock.overflowing_add_signed(delta);
        now.format("%H:%M:%S").to_string()
    }

    pub fn mission_elapsed(&self, time: f64) -> String {
        let (before, delta) = self.elapsed(time);
        format!(
            "L{}{:02}:{:02}:{:02}",
            if before { '-' } else { '+' },
            delta.num_hours(),
            delta.num_minutes() % 60,
            delta.num_seconds() % 60
        )
    }
}
