// Linear interpolation and finite-difference derivatives

use crate::core::error::{Result, TelemetryError};
use crate::core::format::{Bracket, ChannelKind, Fraction, SampleSeries};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How the derivative is forced at an overridden timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OverridePolicy {
    Zero,
    Backward,
    Forward,
    Value { value: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub timestamp: f64,
    #[serde(flatten)]
    pub policy: OverridePolicy,
}

/// Exact-match exceptions to central-difference derivatives.
///
/// Keys compare by bit pattern: `4400.0` matches only a record stamped
/// exactly `4400.0`.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<u64, OverridePolicy>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[OverrideEntry]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry.timestamp, entry.policy);
        }
        table
    }

    pub fn insert(&mut self, timestamp: f64, policy: OverridePolicy) {
        self.entries.insert(key(timestamp), policy);
    }

    pub fn get(&self, timestamp: f64) -> Option<OverridePolicy> {
        self.entries.get(&key(timestamp)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(timestamp: f64) -> u64 {
    // -0.0 and 0.0 are the same timestamp
    if timestamp == 0.0 {
        0.0f64.to_bits()
    } else {
        timestamp.to_bits()
    }
}

pub struct Interpolator;

impl Interpolator {
    /// Position of `time` between the bracket's records, clamped to `[0, 1]`.
    pub fn fraction(series: &SampleSeries, bracket: Bracket, time: f64) -> Fraction {
        let t_lower = series.timestamp(bracket.lower);
        let t_upper = series.timestamp(bracket.upper);
        let span = t_upper - t_lower;

        let raw = if span == 0.0 { 0.0 } else { (time - t_lower) / span };
        let extrapolated = time < t_lower || time > t_upper;

        Fraction {
            t: raw.clamp(0.0, 1.0),
            extrapolated,
        }
    }

    pub fn value_at(series: &SampleSeries, bracket: Bracket, time: f64, channel: usize) -> f64 {
        let fraction = Self::fraction(series, bracket, time);
        Self::blend(series, bracket, fraction, channel)
    }

    /// Value at an already computed fraction.
    pub fn blend(series: &SampleSeries, bracket: Bracket, fraction: Fraction, channel: usize) -> f64 {
        let upper = series.value(bracket.upper, channel);
        match series.channel_kind(channel) {
            ChannelKind::Discrete => upper,
            ChannelKind::Continuous => lerp(fraction.t, series.value(bracket.lower, channel), upper),
        }
    }

    /// Finite-difference derivative of `channel` at `record`.
    pub fn derivative_at(
        series: &SampleSeries,
        record: usize,
        channel: usize,
        overrides: &OverrideTable,
    ) -> Result<f64> {
        let now_time = series.timestamp(record);
        let backward = (record > 0).then(|| difference(series, record - 1, record, channel));
        let forward = (record + 1 < series.len()).then(|| difference(series, record, record + 1, channel));

        let degenerate = TelemetryError::DegenerateInterval { timestamp: now_time };

        if let Some(policy) = overrides.get(now_time) {
            return match policy {
                OverridePolicy::Zero => Ok(0.0),
                OverridePolicy::Value { value } => Ok(value),
                OverridePolicy::Backward => backward.flatten().ok_or(degenerate),
                OverridePolicy::Forward => forward.flatten().ok_or(degenerate),
            };
        }

        match (backward.flatten(), forward.flatten()) {
            (Some(b), Some(f)) => Ok((b + f) / 2.0),
            (Some(one), None) | (None, Some(one)) => Ok(one),
            (None, None) => Err(degenerate),
        }
    }

    /// Derivative at `time`, blended between the bracket's records.
    ///
    /// A degenerate record contributes a zero derivative.
    pub fn rate_at(
        series: &SampleSeries,
        bracket: Bracket,
        fraction: Fraction,
        channel: usize,
        overrides: &OverrideTable,
    ) -> f64 {
        let lower = Self::derivative_or_zero(series, bracket.lower, channel, overrides);
        let upper = Self::derivative_or_zero(series, bracket.upper, channel, overrides);
        lerp(fraction.t, lower, upper)
    }

    fn derivative_or_zero(series: &SampleSeries, record: usize, channel: usize, overrides: &OverrideTable) -> f64 {
        match Self::derivative_at(series, record, channel, overrides) {
            Ok(value) => value,
            Err(e) => {
                debug!("{}: {}", series.name(), e);
                0.0
            }
        }
    }
}

pub fn lerp(t: f64, from: f64, to: f64) -> f64 {
    from + t * (to - from)
}

// None for a zero-duration interval
fn difference(series: &SampleSeries, from: usize, to: usize, channel: usize) -> Option<f64> {
    let dt = series.timestamp(to) - series.timestamp(from);
    if dt == 0.0 {
        return None;
    }
    Some((series.value(to, channel) - series.value(from, channel)) / dt)
}
