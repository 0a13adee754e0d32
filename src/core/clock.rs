// Fixed-rate frame enumeration

use crate::core::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};

/// Sub-range of the timeline whose frames are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubWindow {
    pub start: f64,
    pub duration: f64,
}

impl SubWindow {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub index: u64,
    pub time: f64,
    /// False for warm-up frames before the sub-window.
    pub visible: bool,
}

/// Ticks `index / frame_rate` for `index` in `[0, total_duration * frame_rate)`.
///
/// Frames before a sub-window are still produced, marked invisible, so that
/// stateful consumers see every frame; the sequence stops after the
/// sub-window's last frame. Iterating consumes the clock.
#[derive(Debug)]
pub struct FrameClock {
    frame_rate: f64,
    next_index: u64,
    end_index: u64,
    window: Option<SubWindow>,
}

impl FrameClock {
    pub fn new(frame_rate: f64, total_duration: f64, window: Option<SubWindow>) -> Result<Self> {
        if !(frame_rate > 0.0 && frame_rate.is_finite()) {
            return Err(TelemetryError::InvalidConfig(format!("frame rate must be positive, got {}", frame_rate)));
        }
        if !(total_duration >= 0.0 && total_duration.is_finite()) {
            return Err(TelemetryError::InvalidConfig(format!(
                "total duration must be non-negative, got {}",
                total_duration
            )));
        }

        let mut end_index = (total_duration * frame_rate).ceil() as u64;
        if let Some(window) = window {
            if !(window.duration >= 0.0 && window.duration.is_finite() && window.start.is_finite()) {
                return Err(TelemetryError::InvalidConfig(format!(
                    "window must have a finite start and non-negative duration, got {:?}",
                    window
                )));
            }
            // end * rate can land one ulp off an integer; settle the last
            // index with the same time test `contains` uses
            let end = window.end();
            let mut last_in_window = (end * frame_rate).floor();
            if (last_in_window + 1.0) / frame_rate <= end {
                last_in_window += 1.0;
            } else if last_in_window >= 0.0 && last_in_window / frame_rate > end {
                last_in_window -= 1.0;
            }
            if last_in_window < 0.0 {
                end_index = 0;
            } else {
                end_index = end_index.min((last_in_window as u64).saturating_add(1));
            }
        }

        Ok(Self {
            frame_rate,
            next_index: 0,
            end_index,
            window,
        })
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Frames left to tick, visible or not.
    pub fn remaining(&self) -> u64 {
        self.end_index - self.next_index
    }

    /// Only the frames a consumer should see.
    pub fn visible(self) -> impl Iterator<Item = FrameTick> {
        self.filter(|tick| tick.visible)
    }
}

impl Iterator for FrameClock {
    type Item = FrameTick;

    fn next(&mut self) -> Option<FrameTick> {
        if self.next_index >= self.end_index {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;

        let time = index as f64 / self.frame_rate;
        let visible = self.window.map_or(true, |w| w.contains(time));
        Some(FrameTick { index, time, visible })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range() {
        let ticks: Vec<FrameTick> = FrameClock::new(4.0, 1.0, None).unwrap().collect();
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks.iter().map(|t| t.time).collect::<Vec<_>>(), vec![0.0, 0.25, 0.5, 0.75]);
        assert!(ticks.iter().all(|t| t.visible));
    }

    #[test]
    fn test_sub_window_keeps_warmup_frames() {
        let window = SubWindow { start: 2.0, duration: 1.0 };
        let ticks: Vec<FrameTick> = FrameClock::new(2.0, 10.0, Some(window)).unwrap().collect();
        // every frame up to and including t=3.0 is ticked
        assert_eq!(ticks.len(), 7);
        let visible: Vec<f64> = ticks.iter().filter(|t| t.visible).map(|t| t.time).collect();
        assert_eq!(visible, vec![2.0, 2.5, 3.0]);
    }

    #[test]
    fn test_visible_adapter() {
        let window = SubWindow { start: 0.5, duration: 0.25 };
        let times: Vec<f64> = FrameClock::new(4.0, 5.0, Some(window)).unwrap().visible().map(|t| t.time).collect();
        assert_eq!(times, vec![0.5, 0.75]);
    }

    #[test]
    fn test_window_end_frame_at_fractional_boundary() {
        let window = SubWindow { start: 4.0, duration: 0.1 };
        let ticks: Vec<FrameTick> = FrameClock::new(30.0, 10.0, Some(window)).unwrap().visible().collect();
        let indices: Vec<u64> = ticks.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![120, 121, 122, 123]);
    }

    #[test]
    fn test_last_tick_is_last_frame_in_window() {
        let cases = [(25.0, 1.0, 0.16), (60.0, 2.0, 0.05), (29.97, 3.0, 1.0), (30.0, 4.0, 0.1), (24.0, 0.5, 2.25)];
        for (rate, start, duration) in cases {
            let window = SubWindow { start, duration };
            let last = FrameClock::new(rate, 100.0, Some(window)).unwrap().last().unwrap();
            assert!(last.visible, "{} fps, window {:?}", rate, window);
            assert!(!window.contains((last.index + 1) as f64 / rate), "{} fps, window {:?}", rate, window);
        }
    }

    #[test]
    fn test_rejects_unbounded_window() {
        let window = SubWindow { start: 0.0, duration: f64::INFINITY };
        assert!(FrameClock::new(30.0, 10.0, Some(window)).is_err());
    }

    #[test]
    fn test_window_past_the_end_is_clipped() {
        let window = SubWindow { start: 8.0, duration: 100.0 };
        let clock = FrameClock::new(1.0, 10.0, Some(window)).unwrap();
        assert_eq!(clock.remaining(), 10);
    }

    #[test]
    fn test_rejects_bad_rate() {
        assert!(FrameClock::new(0.0, 10.0, None).is_err());
        assert!(FrameClock::new(f64::NAN, 10.0, None).is_err());
    }

    #[test]
    fn test_not_restartable() {
        let mut clock = FrameClock::new(1.0, 2.0, None).unwrap();
        assert_eq!(clock.by_ref().count(), 2);
        assert!(clock.next().is_none());
    }
}
