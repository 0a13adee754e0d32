// Forward-only read pointer over a sample series

use crate::core::format::{Bracket, SampleSeries};

/// Tracks the bracketing pair of a [`SampleSeries`] as output time advances.
///
/// Query times must be non-decreasing. Over a full pass the cursor advances
/// at most `series.len() - 1` times, so per-frame cost is amortized O(1).
#[derive(Debug)]
pub struct SeriesCursor<'a> {
    series: &'a SampleSeries,
    lower: usize,
    last_time: f64,
    advances: usize,
}

impl<'a> SeriesCursor<'a> {
    pub fn new(series: &'a SampleSeries) -> Self {
        Self {
            series,
            lower: 0,
            last_time: f64::NEG_INFINITY,
            advances: 0,
        }
    }

    pub fn series(&self) -> &'a SampleSeries {
        self.series
    }

    pub fn advance_to(&mut self, time: f64) -> Bracket {
        debug_assert!(
            time >= self.last_time,
            "cursor over '{}' moved backwards: {} -> {}",
            self.series.name(),
            self.last_time,
            time
        );
        self.last_time = time;

        let last = self.series.len() - 1;
        while self.lower + 1 < last && self.series.timestamp(self.lower + 1) < time {
            self.lower += 1;
            self.advances += 1;
        }

        self.bracket()
    }

    pub fn bracket(&self) -> Bracket {
        let upper = (self.lower + 1).min(self.series.len() - 1);
        Bracket {
            lower: self.lower,
            upper,
        }
    }

    /// Total number of single-record steps taken so far.
    pub fn advances(&self) -> usize {
        self.advances
    }
}
