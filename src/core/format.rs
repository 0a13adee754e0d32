// Data structures for fixed-stride telemetry series

use crate::core::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Linearly interpolated between records.
    #[default]
    Continuous,
    /// Held at the upper record's value (booleans, switch states).
    Discrete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
}

impl ChannelMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ChannelKind::Continuous,
        }
    }

    pub fn discrete(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ChannelKind::Discrete,
        }
    }
}

/// One telemetry log: `[t0, ch0_0, ch1_0, ..., t1, ch0_1, ...]`.
///
/// Records are `1 + channels.len()` values wide. The series is validated on
/// construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct SampleSeries {
    name: String,
    channels: Vec<ChannelMetadata>,
    data: Vec<f64>,
}

impl SampleSeries {
    pub fn new(name: impl Into<String>, channels: Vec<ChannelMetadata>, data: Vec<f64>) -> Result<Self> {
        let name = name.into();
        let stride = channels.len() + 1;

        if data.is_empty() {
            return Err(TelemetryError::malformed(&name, "series has no records"));
        }
        if data.len() % stride != 0 {
            return Err(TelemetryError::malformed(
                &name,
                format!("length {} is not a multiple of stride {}", data.len(), stride),
            ));
        }

        if data[0].is_nan() {
            return Err(TelemetryError::malformed(&name, "first timestamp is NaN"));
        }

        let mut duplicates = 0usize;
        for i in 1..data.len() / stride {
            let prev = data[(i - 1) * stride];
            let now = data[i * stride];
            if now.is_nan() || now < prev {
                return Err(TelemetryError::malformed(
                    &name,
                    format!("timestamp decreases at record {}: {} -> {}", i, prev, now),
                ));
            }
            if now == prev {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!("series '{}' has {} duplicate timestamps", name, duplicates);
        }

        Ok(Self { name, channels, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stride(&self) -> usize {
        self.channels.len() + 1
    }

    pub fn channels(&self) -> &[ChannelMetadata] {
        &self.channels
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len() / self.stride()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn timestamp(&self, record: usize) -> f64 {
        self.data[record * self.stride()]
    }

    pub fn value(&self, record: usize, channel: usize) -> f64 {
        self.data[record * self.stride() + 1 + channel]
    }

    pub fn channel_kind(&self, channel: usize) -> ChannelKind {
        self.channels[channel].kind
    }

    pub fn first_timestamp(&self) -> f64 {
        self.timestamp(0)
    }

    pub fn last_timestamp(&self) -> f64 {
        self.timestamp(self.len() - 1)
    }

    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }

    pub fn require_channel(&self, name: &str) -> Result<usize> {
        self.channel_index(name).ok_or_else(|| TelemetryError::ChannelNotFound {
            series: self.name.clone(),
            channel: name.to_string(),
        })
    }
}

/// Which two records surround a query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub lower: usize,
    pub upper: usize,
}

/// Position of a query time inside a bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fraction {
    pub t: f64,
    /// The query time fell outside the bracket and `t` was clamped.
    pub extrapolated: bool,
}
