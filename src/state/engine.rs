use std::collections::HashMap;
use tracing::{debug, info};

use crate::core::calibration::{CoordinateMapper, Point};
use crate::core::clock::{FrameClock, FrameTick};
use crate::core::constants::MAX_CHART_SAMPLES;
use crate::core::cursor::SeriesCursor;
use crate::core::error::{Result, TelemetryError};
use crate::core::format::{Bracket, ChannelKind, Fraction, SampleSeries};
use crate::core::interpolate::{Interpolator, OverrideTable};
use crate::core::mission_clock::MissionClock;
use crate::core::projector::KinematicProjector;
use crate::core::units::{convert, Thermistor, Unit};
use crate::core::window::{RollingWindow, RollingWindows};
use crate::models::overlay_model::{
    ChartSampling, ColorScale, MarkerSource, OverlayConfig, Quantity,
};
use crate::state::snapshot::{ChartTrace, Converted, Flag, FrameSnapshot, Marker, Readout};

#[derive(Debug, Clone, Copy)]
enum QuantityPlan {
    Value { series: usize, channel: usize },
    Rate { series: usize, channel: usize },
    Magnitude { series: usize, x: usize, y: usize, rate: bool },
    Heading { series: usize, north: usize, east: usize, min_speed: f64 },
    Thermistor { series: usize, channel: usize, thermistor: Thermistor },
}

impl QuantityPlan {
    fn series(&self) -> usize {
        match *self {
            QuantityPlan::Value { series, .. }
            | QuantityPlan::Rate { series, .. }
            | QuantityPlan::Magnitude { series, .. }
            | QuantityPlan::Heading { series, .. }
            | QuantityPlan::Thermistor { series, .. } => series,
        }
    }
}

struct ReadoutPlan {
    name: String,
    quantity: QuantityPlan,
    unit: Unit,
    display: Vec<Unit>,
    scale: Option<ColorScale>,
}

struct FlagPlan {
    name: String,
    series: usize,
    channel: usize,
}

enum MarkerSourcePlan {
    Planar { series: usize, x: usize, y: usize },
    TimeValue { readout: usize },
    Projector(KinematicProjector),
}

struct MarkerPlan {
    name: String,
    source: MarkerSourcePlan,
    mapper: CoordinateMapper,
    radius: Option<f64>,
}

enum SamplingPlan {
    Frame,
    Record { series: usize, last_record: Option<usize> },
}

struct ChartPlan {
    name: String,
    readout: usize,
    sampling: SamplingPlan,
    last_push: Option<f64>,
}

/// Cursor plus the per-frame interpolation state of one series.
struct SeriesState<'a> {
    cursor: SeriesCursor<'a>,
    overrides: Vec<OverrideTable>,
    bracket: Bracket,
    fraction: Fraction,
    out_of_range: bool,
}

impl<'a> SeriesState<'a> {
    fn new(series: &'a SampleSeries) -> Self {
        Self {
            cursor: SeriesCursor::new(series),
            overrides: vec![OverrideTable::new(); series.channels().len()],
            bracket: Bracket { lower: 0, upper: 0 },
            fraction: Fraction { t: 0.0, extrapolated: false },
            out_of_range: false,
        }
    }

    fn series(&self) -> &'a SampleSeries {
        self.cursor.series()
    }

    fn value(&self, channel: usize) -> f64 {
        Interpolator::blend(self.series(), self.bracket, self.fraction, channel)
    }

    fn rate(&self, channel: usize) -> f64 {
        Interpolator::rate_at(self.series(), self.bracket, self.fraction, channel, &self.overrides[channel])
    }

    // Latest record at or before `time` (the first record before the series starts)
    fn latest_record(&self, time: f64) -> usize {
        if time >= self.series().timestamp(self.bracket.upper) {
            self.bracket.upper
        } else {
            self.bracket.lower
        }
    }
}

struct Lookup<'c> {
    series: &'c [SampleSeries],
    by_name: HashMap<&'c str, usize>,
}

impl<'c> Lookup<'c> {
    fn new(series: &'c [SampleSeries]) -> Self {
        let by_name = series.iter().enumerate().map(|(i, s)| (s.name(), i)).collect();
        Self { series, by_name }
    }

    fn series(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TelemetryError::SeriesNotFound(name.to_string()))
    }

    fn channel(&self, series: usize, name: &str) -> Result<usize> {
        self.series[series].require_channel(name)
    }

    fn quantity(&self, quantity: &Quantity) -> Result<QuantityPlan> {
        let series = self.series(quantity.series())?;
        Ok(match quantity {
            Quantity::Value { channel, .. } => QuantityPlan::Value {
                series,
                channel: self.channel(series, channel)?,
            },
            Quantity::Rate { channel, .. } => QuantityPlan::Rate {
                series,
                channel: self.channel(series, channel)?,
            },
            Quantity::Magnitude { x, y, rate, .. } => QuantityPlan::Magnitude {
                series,
                x: self.channel(series, x)?,
                y: self.channel(series, y)?,
                rate: *rate,
            },
            Quantity::Heading { north, east, min_speed, .. } => QuantityPlan::Heading {
                series,
                north: self.channel(series, north)?,
                east: self.channel(series, east)?,
                min_speed: *min_speed,
            },
            Quantity::Thermistor { channel, coefficients, .. } => QuantityPlan::Thermistor {
                series,
                channel: self.channel(series, channel)?,
                thermistor: *coefficients,
            },
        })
    }
}

fn unique<'n>(kind: &str, names: impl Iterator<Item = &'n str>) -> Result<HashMap<&'n str, usize>> {
    let mut index = HashMap::new();
    for (i, name) in names.enumerate() {
        if index.insert(name, i).is_some() {
            return Err(TelemetryError::InvalidConfig(format!("duplicate {} name '{}'", kind, name)));
        }
    }
    Ok(index)
}

/// Course over ground in degrees clockwise from north, `[0, 360)`.
pub fn course_degrees(north_rate: f64, east_rate: f64) -> f64 {
    let course = east_rate.atan2(north_rate).to_degrees();
    if course < 0.0 {
        course + 360.0
    } else {
        course
    }
}

/// Resamples a set of telemetry series onto a fixed frame rate.
///
/// Owns every piece of mutable state (cursors, chart windows) and borrows
/// the series for its whole life. Frames are pulled one at a time with
/// [`OverlayEngine::next_frame`]; the sequence runs once and cannot be
/// restarted.
pub struct OverlayEngine<'a> {
    series: Vec<SeriesState<'a>>,
    readouts: Vec<ReadoutPlan>,
    flags: Vec<FlagPlan>,
    markers: Vec<MarkerPlan>,
    charts: Vec<ChartPlan>,
    windows: RollingWindows,
    mission_clock: Option<MissionClock>,
    clock: FrameClock,
    values: Vec<Option<f64>>,
    time: f64,
    ticks: u64,
}

impl<'a> OverlayEngine<'a> {
    pub fn new(config: &OverlayConfig, series: &'a [SampleSeries]) -> Result<Self> {
        let clock = FrameClock::new(config.frame_rate, config.total_duration, config.window)?;
        let lookup = Lookup::new(series);
        let mut states: Vec<SeriesState<'a>> = series.iter().map(SeriesState::new).collect();

        for table in &config.overrides {
            let s = lookup.series(&table.series)?;
            let ch = lookup.channel(s, &table.channel)?;
            for entry in &table.entries {
                states[s].overrides[ch].insert(entry.timestamp, entry.policy);
            }
            debug!(
                "{} derivative override(s) on {}.{}",
                table.entries.len(),
                table.series,
                table.channel
            );
        }

        let mut mappers: HashMap<&str, CoordinateMapper> = HashMap::new();
        for (name, calibration) in &config.calibrations {
            let mapper = CoordinateMapper::from_config(calibration).map_err(|e| match e {
                TelemetryError::DegenerateCalibration(msg) => {
                    TelemetryError::DegenerateCalibration(format!("{}: {}", name, msg))
                }
                other => other,
            })?;
            mappers.insert(name.as_str(), mapper);
        }
        let mapper = |name: &str| {
            mappers
                .get(name)
                .copied()
                .ok_or_else(|| TelemetryError::CalibrationNotFound(name.to_string()))
        };

        let readout_index = unique("readout", config.readouts.iter().map(|r| r.name.as_str()))?;
        let mut readouts = Vec::with_capacity(config.readouts.len());
        for readout in &config.readouts {
            for display in &readout.display {
                if display.dimension() != readout.unit.dimension() {
                    return Err(TelemetryError::IncompatibleUnits {
                        from: readout.unit.to_string(),
                        to: display.to_string(),
                    });
                }
            }
            if let Some(scale) = readout.scale {
                if scale.min == scale.max {
                    return Err(TelemetryError::InvalidConfig(format!(
                        "readout '{}' has an empty color scale",
                        readout.name
                    )));
                }
            }
            readouts.push(ReadoutPlan {
                name: readout.name.clone(),
                quantity: lookup.quantity(&readout.quantity)?,
                unit: readout.unit,
                display: readout.display.clone(),
                scale: readout.scale,
            });
        }
        let find_readout = |name: &str| {
            readout_index
                .get(name)
                .copied()
                .ok_or_else(|| TelemetryError::ReadoutNotFound(name.to_string()))
        };

        let flags = config
            .flags
            .iter()
            .map(|flag| {
                let series = lookup.series(&flag.series)?;
                let channel = lookup.channel(series, &flag.channel)?;
                if lookup.series[series].channel_kind(channel) != ChannelKind::Discrete {
                    return Err(TelemetryError::InvalidConfig(format!(
                        "flag '{}' reads {}.{}, which is not a discrete channel",
                        flag.name, flag.series, flag.channel
                    )));
                }
                Ok(FlagPlan {
                    name: flag.name.clone(),
                    series,
                    channel,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let projector = config.projector.as_ref().map(KinematicProjector::new);
        let mut markers = Vec::with_capacity(config.markers.len());
        for marker in &config.markers {
            let source = match &marker.source {
                MarkerSource::Planar { series, x, y } => {
                    let s = lookup.series(series)?;
                    MarkerSourcePlan::Planar {
                        series: s,
                        x: lookup.channel(s, x)?,
                        y: lookup.channel(s, y)?,
                    }
                }
                MarkerSource::TimeValue { readout } => MarkerSourcePlan::TimeValue {
                    readout: find_readout(readout)?,
                },
                MarkerSource::Projector => MarkerSourcePlan::Projector(projector.ok_or_else(|| {
                    TelemetryError::InvalidConfig(format!("marker '{}' needs a projector", marker.name))
                })?),
            };
            let radius = match &marker.radius {
                Some(radius) => Some(mapper(&radius.calibration)?.scale().to_display(radius.domain_length)),
                None => None,
            };
            markers.push(MarkerPlan {
                name: marker.name.clone(),
                source,
                mapper: mapper(&marker.calibration)?,
                radius,
            });
        }

        unique("chart", config.charts.iter().map(|c| c.name.as_str()))?;
        let mut windows = RollingWindows::new();
        let mut charts = Vec::with_capacity(config.charts.len());
        for chart in &config.charts {
            if chart.duration_seconds.is_nan() || chart.duration_seconds <= 0.0 {
                return Err(TelemetryError::InvalidConfig(format!(
                    "chart '{}' needs a positive duration",
                    chart.name
                )));
            }
            let readout = find_readout(&chart.readout)?;
            let (sampling, rate) = match chart.sampling {
                ChartSampling::Frame => (SamplingPlan::Frame, chart.sample_rate.unwrap_or(config.frame_rate)),
                ChartSampling::Record => {
                    let rate = chart.sample_rate.ok_or_else(|| {
                        TelemetryError::InvalidConfig(format!(
                            "chart '{}' samples per record and needs a sample_rate",
                            chart.name
                        ))
                    })?;
                    let sampling = SamplingPlan::Record {
                        series: readouts[readout].quantity.series(),
                        last_record: None,
                    };
                    (sampling, rate)
                }
            };
            if !(rate.is_finite() && rate > 0.0) {
                return Err(TelemetryError::InvalidConfig(format!(
                    "chart '{}' needs a positive sample_rate, got {}",
                    chart.name, rate
                )));
            }
            let samples = chart.duration_seconds * rate;
            if !(samples.is_finite() && samples <= MAX_CHART_SAMPLES) {
                return Err(TelemetryError::InvalidConfig(format!(
                    "chart '{}' would hold {} samples (max {})",
                    chart.name, samples, MAX_CHART_SAMPLES
                )));
            }
            let window = RollingWindow::with_duration(chart.duration_seconds, rate);
            debug!("chart '{}': {} samples", chart.name, window.max_length());
            windows.insert(chart.name.clone(), window);
            charts.push(ChartPlan {
                name: chart.name.clone(),
                readout,
                sampling,
                last_push: None,
            });
        }

        info!(
            "Engine ready: {} series, {} readouts, {} markers, {} charts, {} frames at {} fps",
            states.len(),
            readouts.len(),
            markers.len(),
            charts.len(),
            clock.remaining(),
            clock.frame_rate()
        );

        Ok(Self {
            series: states,
            values: vec![None; readouts.len()],
            readouts,
            flags,
            markers,
            charts,
            windows,
            mission_clock: config.mission_clock.as_ref().map(MissionClock::new),
            clock,
            time: 0.0,
            ticks: 0,
        })
    }

    /// Advances to the next visible frame, ticking any warm-up frames on the way.
    pub fn next_frame(&mut self) -> Option<FrameSnapshot<'_>> {
        loop {
            let tick = self.clock.next()?;
            self.tick(tick.time);
            if tick.visible {
                return Some(self.snapshot(tick));
            }
        }
    }

    /// Feeds every remaining frame to `consume`; returns the number emitted.
    pub fn run<F, E>(&mut self, mut consume: F) -> std::result::Result<u64, E>
    where
        F: FnMut(FrameSnapshot<'_>) -> std::result::Result<(), E>,
    {
        let mut emitted = 0u64;
        while let Some(frame) = self.next_frame() {
            consume(frame)?;
            emitted += 1;
        }
        info!("Emitted {} frames ({} ticked)", emitted, self.ticks);
        Ok(emitted)
    }

    /// Frames computed so far, visible or not.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn windows(&self) -> &RollingWindows {
        &self.windows
    }

    fn tick(&mut self, time: f64) {
        self.time = time;
        self.ticks += 1;

        for state in &mut self.series {
            let bracket = state.cursor.advance_to(time);
            let series = state.cursor.series();
            state.bracket = bracket;
            state.fraction = Interpolator::fraction(series, bracket, time);

            let out_of_range = time < series.first_timestamp() || time > series.last_timestamp();
            if out_of_range && !state.out_of_range {
                debug!(
                    "{}: {}, clamping",
                    series.name(),
                    TelemetryError::OutOfRangeTime {
                        time,
                        first: series.first_timestamp(),
                        last: series.last_timestamp(),
                    }
                );
            }
            state.out_of_range = out_of_range;
        }

        let values: Vec<Option<f64>> = self.readouts.iter().map(|r| self.evaluate(r.quantity)).collect();
        self.values = values;

        for chart in &mut self.charts {
            let due = match &mut chart.sampling {
                SamplingPlan::Frame => true,
                SamplingPlan::Record { series, last_record } => {
                    let record = self.series[*series].latest_record(time);
                    let changed = *last_record != Some(record);
                    *last_record = Some(record);
                    changed
                }
            };
            if !due {
                continue;
            }
            // NaN keeps one entry per sample while the readout is undefined
            let value = self.values[chart.readout].unwrap_or(f64::NAN);
            self.windows.push(&chart.name, value);
            chart.last_push = Some(time);
        }
    }

    fn evaluate(&self, quantity: QuantityPlan) -> Option<f64> {
        let state = &self.series[quantity.series()];
        match quantity {
            QuantityPlan::Value { channel, .. } => Some(state.value(channel)),
            QuantityPlan::Rate { channel, .. } => Some(state.rate(channel)),
            QuantityPlan::Magnitude { x, y, rate: false, .. } => Some(state.value(x).hypot(state.value(y))),
            QuantityPlan::Magnitude { x, y, rate: true, .. } => Some(state.rate(x).hypot(state.rate(y))),
            QuantityPlan::Heading { north, east, min_speed, .. } => {
                let north_rate = state.rate(north);
                let east_rate = state.rate(east);
                if north_rate.hypot(east_rate) < min_speed {
                    None
                } else {
                    Some(course_degrees(north_rate, east_rate))
                }
            }
            QuantityPlan::Thermistor { channel, thermistor, .. } => {
                let celsius = thermistor.celsius(state.value(channel));
                celsius.is_finite().then_some(celsius)
            }
        }
    }

    fn snapshot(&self, tick: FrameTick) -> FrameSnapshot<'_> {
        let readouts = self
            .readouts
            .iter()
            .zip(&self.values)
            .map(|(plan, value)| Readout {
                name: &plan.name,
                unit: plan.unit,
                value: *value,
                converted: value
                    .map(|v| {
                        plan.display
                            .iter()
                            .filter_map(|unit| {
                                convert(v, plan.unit, *unit).ok().map(|value| Converted { unit: *unit, value })
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
                scale_position: plan
                    .scale
                    .zip(*value)
                    .map(|(scale, v)| (v - scale.min) / (scale.max - scale.min)),
            })
            .collect();

        let flags = self
            .flags
            .iter()
            .map(|flag| Flag {
                name: &flag.name,
                on: self.series[flag.series].value(flag.channel) != 0.0,
            })
            .collect();

        let markers = self
            .markers
            .iter()
            .map(|marker| {
                let domain = match &marker.source {
                    MarkerSourcePlan::Planar { series, x, y } => {
                        let state = &self.series[*series];
                        Some(Point::new(state.value(*x), state.value(*y)))
                    }
                    MarkerSourcePlan::TimeValue { readout } => self.values[*readout].map(|v| Point::new(self.time, v)),
                    MarkerSourcePlan::Projector(projector) => Some(projector.position_at(self.time)),
                };
                Marker {
                    name: &marker.name,
                    position: domain.map(|p| marker.mapper.map(p)),
                    radius: marker.radius,
                }
            })
            .collect();

        let charts = self
            .charts
            .iter()
            .filter_map(|chart| {
                self.windows.snapshot(&chart.name).map(|values| ChartTrace {
                    name: &chart.name,
                    values,
                    latest_age: chart.last_push.map(|t| self.time - t),
                })
            })
            .collect();

        FrameSnapshot {
            index: tick.index,
            time: tick.time,
            wall_clock: self.mission_clock.map(|c| c.wall_clock(tick.time)),
            mission_elapsed: self.mission_clock.map(|c| c.mission_elapsed(tick.time)),
            readouts,
            flags,
            markers,
            charts,
            out_of_range: self
                .series
                .iter()
                .filter(|s| s.out_of_range)
                .map(|s| s.series().name())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::ChannelMetadata;
    use std::convert::Infallible;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn altitude_series() -> Vec<SampleSeries> {
        vec![SampleSeries::new(
            "balloon",
            vec![ChannelMetadata::new("alt"), ChannelMetadata::discrete("heater")],
            vec![0.0, 0.0, 0.0, 10.0, 100.0, 1.0, 20.0, 300.0, 1.0],
        )
        .unwrap()]
    }

    fn config(extra: &str) -> OverlayConfig {
        let json = format!(
            r#"{{
                "frame_rate": 1,
                "total_duration": 20,
                "series": [],
                "readouts": [
                    {{"name": "altitude", "quantity": {{"kind": "value", "series": "balloon", "channel": "alt"}},
                     "unit": "meter", "display": ["foot"], "scale": {{"min": 0, "max": 400}}}},
                    {{"name": "climb", "quantity": {{"kind": "rate", "series": "balloon", "channel": "alt"}},
                     "unit": "meters_per_second"}}
                ],
                "flags": [{{"name": "heater", "series": "balloon", "channel": "heater"}}]
                {}
            }}"#,
            extra
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_values_rates_and_conversions() {
        let series = altitude_series();
        let mut engine = OverlayEngine::new(&config(""), &series).unwrap();

        let mut seen = Vec::new();
        while let Some(frame) = engine.next_frame() {
            let alt = frame.readout("altitude").unwrap();
            seen.push((
                frame.time,
                alt.value.unwrap(),
                alt.in_unit(Unit::Foot).unwrap(),
                alt.scale_position.unwrap(),
                frame.readout("climb").unwrap().value.unwrap(),
                frame.flag("heater").unwrap(),
            ));
        }

        assert_eq!(seen.len(), 20);
        let (time, alt, feet, position, climb, heater) = seen[5];
        assert_eq!(time, 5.0);
        assert!(approx(alt, 50.0));
        assert!(approx(feet, 50.0 * 3.281));
        assert!(approx(position, 0.125));
        assert!(approx(climb, 12.5));
        assert!(heater);

        let (_, alt, _, _, climb, _) = seen[15];
        assert!(approx(alt, 200.0));
        assert!(approx(climb, 17.5));
    }

    #[test]
    fn test_override_zeroes_rate_at_record() {
        let series = altitude_series();
        let config = config(
            r#", "overrides": [{"series": "balloon", "channel": "alt",
                 "entries": [{"timestamp": 10.0, "policy": "zero"}]}]"#,
        );
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        let mut climbs = Vec::new();
        engine
            .run(|frame| {
                climbs.push(frame.readout("climb").unwrap().value.unwrap());
                Ok::<_, Infallible>(())
            })
            .unwrap();

        assert!(approx(climbs[5], 5.0));
        assert!(approx(climbs[10], 0.0));
        assert!(approx(climbs[15], 10.0));
    }

    #[test]
    fn test_window_ticks_warm_up_frames() {
        let series = altitude_series();
        let config = config(
            r#", "window": {"start": 10, "duration": 5},
                 "charts": [{"name": "alt", "readout": "altitude", "duration_seconds": 3}]"#,
        );
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        let first = engine.next_frame().unwrap();
        assert_eq!(first.index, 10);
        let trace = first.chart("alt").unwrap();
        let values: Vec<f64> = trace.values.iter().copied().collect();
        assert_eq!(values.len(), 4);
        assert!(approx(values[0], 70.0));
        assert!(approx(values[3], 100.0));
        assert_eq!(trace.latest_age, Some(0.0));

        let emitted = engine.run(|_| Ok::<_, Infallible>(())).unwrap();
        assert_eq!(emitted, 5);
        assert_eq!(engine.ticks(), 16);
    }

    #[test]
    fn test_record_sampled_chart_pushes_per_record() {
        let series = vec![SampleSeries::new(
            "slow",
            vec![ChannelMetadata::new("temp")],
            vec![0.0, 20.0, 2.0, 19.0, 4.0, 18.0, 6.0, 17.0, 8.0, 16.0, 10.0, 15.0],
        )
        .unwrap()];
        let config: OverlayConfig = serde_json::from_str(
            r#"{"frame_rate": 1, "total_duration": 10, "series": [],
                "readouts": [{"name": "temp", "unit": "celsius",
                              "quantity": {"kind": "value", "series": "slow", "channel": "temp"}}],
                "charts": [{"name": "temp", "readout": "temp", "duration_seconds": 10,
                            "sampling": "record", "sample_rate": 0.5}]}"#,
        )
        .unwrap();
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        let mut last = None;
        engine
            .run(|frame| {
                let trace = frame.chart("temp").unwrap();
                last = Some((trace.values.iter().copied().collect::<Vec<_>>(), trace.latest_age));
                Ok::<_, Infallible>(())
            })
            .unwrap();

        let (values, age) = last.unwrap();
        assert_eq!(values, vec![20.0, 19.0, 18.0, 17.0, 16.0]);
        assert_eq!(age, Some(1.0));
        assert_eq!(engine.windows().get("temp").unwrap().max_length(), 6);
    }

    #[test]
    fn test_course_undefined_at_rest() {
        let series = vec![SampleSeries::new(
            "gps",
            vec![ChannelMetadata::new("north"), ChannelMetadata::new("east")],
            vec![0.0, 5.0, 5.0, 1.0, 5.0, 5.0, 2.0, 6.0, 6.0],
        )
        .unwrap()];
        let config: OverlayConfig = serde_json::from_str(
            r#"{"frame_rate": 2, "total_duration": 2, "series": [],
                "readouts": [{"name": "course", "unit": "degree", "display": ["degree"],
                              "quantity": {"kind": "heading", "series": "gps", "north": "north", "east": "east"}}]}"#,
        )
        .unwrap();
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        let first = engine.next_frame().unwrap();
        let course = first.readout("course").unwrap();
        assert_eq!(course.value, None);
        assert!(course.converted.is_empty());

        // t = 1.5 moves north-east
        let mut course = None;
        engine
            .run(|frame| {
                course = frame.readout("course").unwrap().value;
                Ok::<_, Infallible>(())
            })
            .unwrap();
        assert!(approx(course.unwrap(), 45.0));
    }

    #[test]
    fn test_course_degrees_wraps() {
        assert!(approx(course_degrees(1.0, 0.0), 0.0));
        assert!(approx(course_degrees(0.0, 1.0), 90.0));
        assert!(approx(course_degrees(-1.0, 0.0), 180.0));
        assert!(approx(course_degrees(0.0, -1.0), 270.0));
    }

    #[test]
    fn test_out_of_range_series_are_reported() {
        let series = vec![SampleSeries::new("late", vec![ChannelMetadata::new("v")], vec![2.0, 1.0, 4.0, 3.0]).unwrap()];
        let config: OverlayConfig = serde_json::from_str(
            r#"{"frame_rate": 1, "total_duration": 6, "series": [],
                "readouts": [{"name": "v", "unit": "volt",
                              "quantity": {"kind": "value", "series": "late", "channel": "v"}}]}"#,
        )
        .unwrap();
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        let mut report = Vec::new();
        engine
            .run(|frame| {
                report.push((frame.out_of_range.len(), frame.readout("v").unwrap().value.unwrap()));
                Ok::<_, Infallible>(())
            })
            .unwrap();

        assert_eq!(report[0], (1, 1.0));
        assert_eq!(report[3], (0, 2.0));
        assert_eq!(report[5], (1, 3.0));
    }

    #[test]
    fn test_markers_map_through_calibration() {
        let series = vec![SampleSeries::new(
            "gps",
            vec![ChannelMetadata::new("east"), ChannelMetadata::new("north")],
            vec![0.0, 0.0, 0.0, 10.0, 100.0, 200.0],
        )
        .unwrap()];
        let config: OverlayConfig = serde_json::from_str(
            r#"{"frame_rate": 1, "total_duration": 10, "series": [],
                "calibrations": {"map": {"domain_a": [0, 0], "domain_b": [100, 100],
                                         "display_a": [10, 500], "display_b": [210, 300]}},
                "markers": [{"name": "balloon", "calibration": "map",
                             "source": {"kind": "planar", "series": "gps", "x": "east", "y": "north"},
                             "radius": {"domain_length": 50, "calibration": "map"}}]}"#,
        )
        .unwrap();
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        for _ in 0..5 {
            engine.next_frame().unwrap();
        }
        let frame = engine.next_frame().unwrap();
        let marker = frame.marker("balloon").unwrap();
        let position = marker.position.unwrap();
        assert!(approx(position.x, 110.0));
        assert!(approx(position.y, 300.0));
        assert!(marker.radius.unwrap() > 0.0);
    }

    #[test]
    fn test_unknown_names_are_fatal() {
        let series = altitude_series();
        let mut config = config("");
        config.flags[0].channel = "valve".to_string();
        let err = OverlayEngine::new(&config, &series).err().unwrap();
        assert!(matches!(err, TelemetryError::ChannelNotFound { .. }));

        let err = OverlayEngine::new(&self::config(""), &[]).err().unwrap();
        assert!(matches!(err, TelemetryError::SeriesNotFound(_)));
    }

    #[test]
    fn test_incompatible_display_unit_is_rejected() {
        let series = altitude_series();
        let mut config = config("");
        config.readouts[0].display.push(Unit::Psi);
        let err = OverlayEngine::new(&config, &series).err().unwrap();
        assert!(matches!(err, TelemetryError::IncompatibleUnits { .. }));
    }

    #[test]
    fn test_oversized_chart_is_rejected() {
        let series = altitude_series();
        let config = config(r#", "charts": [{"name": "alt", "readout": "altitude", "duration_seconds": 1e300}]"#);
        let err = OverlayEngine::new(&config, &series).err().unwrap();
        assert!(matches!(err, TelemetryError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_chart_sample_rate_is_rejected() {
        let series = altitude_series();
        for rate in ["0", "-2"] {
            let config = config(&format!(
                r#", "charts": [{{"name": "alt", "readout": "altitude", "duration_seconds": 3, "sample_rate": {}}}]"#,
                rate
            ));
            let err = OverlayEngine::new(&config, &series).err().unwrap();
            assert!(matches!(err, TelemetryError::InvalidConfig(_)), "rate {}", rate);
        }
    }

    #[test]
    fn test_flag_on_continuous_channel_is_rejected() {
        let series = altitude_series();
        let mut config = config("");
        config.flags[0].channel = "alt".to_string();
        let err = OverlayEngine::new(&config, &series).err().unwrap();
        assert!(matches!(err, TelemetryError::InvalidConfig(_)));
    }

    #[test]
    fn test_chart_marks_undefined_readout_with_nan() {
        let series = vec![SampleSeries::new(
            "gps",
            vec![ChannelMetadata::new("north"), ChannelMetadata::new("east")],
            vec![0.0, 5.0, 5.0, 1.0, 5.0, 5.0, 2.0, 6.0, 6.0],
        )
        .unwrap()];
        let config: OverlayConfig = serde_json::from_str(
            r#"{"frame_rate": 2, "total_duration": 2, "series": [],
                "readouts": [{"name": "course", "unit": "degree",
                              "quantity": {"kind": "heading", "series": "gps", "north": "north", "east": "east"}}],
                "charts": [{"name": "course", "readout": "course", "duration_seconds": 10}]}"#,
        )
        .unwrap();
        let mut engine = OverlayEngine::new(&config, &series).unwrap();

        let mut last = Vec::new();
        engine
            .run(|frame| {
                last = frame.chart("course").unwrap().values.iter().copied().collect();
                Ok::<_, Infallible>(())
            })
            .unwrap();

        // one entry per frame, at rest only at t = 0
        assert_eq!(last.len(), 4);
        assert!(last[0].is_nan());
        assert!(last[1..].iter().all(|v| approx(*v, 45.0)));
    }

    #[test]
    fn test_record_chart_requires_sample_rate() {
        let series = altitude_series();
        let config = config(
            r#", "charts": [{"name": "alt", "readout": "altitude", "duration_seconds": 3, "sampling": "record"}]"#,
        );
        let err = OverlayEngine::new(&config, &series).err().unwrap();
        assert!(matches!(err, TelemetryError::InvalidConfig(_)));
    }
}
