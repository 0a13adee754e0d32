// Trailing history buffers for strip charts

use std::collections::{HashMap, VecDeque};

/// FIFO of the most recent `max_length` values, oldest first.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    max_length: usize,
}

impl RollingWindow {
    pub fn new(max_length: usize) -> Self {
        Self {
            values: VecDeque::new(),
            max_length: max_length.max(1),
        }
    }

    /// Window covering `duration_seconds` at `sample_rate` pushes per second,
    /// plus the sample at the leading edge.
    pub fn with_duration(duration_seconds: f64, sample_rate: f64) -> Self {
        Self::new(((duration_seconds * sample_rate).round() as usize).saturating_add(1))
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.max_length {
            self.values.pop_front();
        }
    }

    pub fn snapshot(&self) -> &VecDeque<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }
}

/// One [`RollingWindow`] per chart channel.
#[derive(Debug, Default)]
pub struct RollingWindows {
    windows: HashMap<String, RollingWindow>,
}

impl RollingWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: impl Into<String>, window: RollingWindow) {
        self.windows.insert(channel.into(), window);
    }

    /// Returns false when no window is registered for `channel`.
    pub fn push(&mut self, channel: &str, value: f64) -> bool {
        match self.windows.get_mut(channel) {
            Some(window) => {
                window.push(value);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self, channel: &str) -> Option<&VecDeque<f64>> {
        self.windows.get(channel).map(RollingWindow::snapshot)
    }

    pub fn get(&self, channel: &str) -> Option<&RollingWindow> {
        self.windows.get(channel)
    }
}
