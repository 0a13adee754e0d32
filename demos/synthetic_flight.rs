// Example: overlay a synthetic balloon flight without any files on disk

use serde_json::json;
use telemetry_overlay::core::units::Unit;
use telemetry_overlay::{ChannelMetadata, OverlayConfig, OverlayEngine, Result, SampleSeries};
use tracing::{info, Level};

fn gps_series() -> Result<SampleSeries> {
    // 1 Hz fixes, drifting east while climbing at ~5 m/s
    let mut data = Vec::new();
    for i in 0..=120 {
        let t = i as f64;
        data.extend_from_slice(&[t, 3.0 * t, 1.5 * t, 5.0 * t + 0.5 * (t / 10.0).sin()]);
    }
    SampleSeries::new(
        "gps",
        vec![
            ChannelMetadata::new("east"),
            ChannelMetadata::new("north"),
            ChannelMetadata::new("alt"),
        ],
        data,
    )
}

fn slow_series() -> Result<SampleSeries> {
    // 0.2 Hz housekeeping: pressure, thermistor voltage, heater
    let mut data = Vec::new();
    for i in 0..=24 {
        let t = 5.0 * i as f64;
        let pressure = 1013.25 * (-5.0 * t / 8400.0).exp();
        let volts = 3.0 - 0.004 * t;
        let heater = if volts < 2.8 { 1.0 } else { 0.0 };
        data.extend_from_slice(&[t, pressure, volts, heater]);
    }
    SampleSeries::new(
        "slow",
        vec![
            ChannelMetadata::new("pressure"),
            ChannelMetadata::new("thermistor"),
            ChannelMetadata::discrete("heater"),
        ],
        data,
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let series = vec![gps_series()?, slow_series()?];

    let config: OverlayConfig = serde_json::from_value(json!({
        "name": "synthetic",
        "frame_rate": 2,
        "total_duration": 120,
        "window": {"start": 60, "duration": 30},
        "series": [],
        "calibrations": {
            "map": {"domain_a": [0, 0], "domain_b": [1000, 1000],
                    "display_a": [0, 1080], "display_b": [1080, 0]}
        },
        "readouts": [
            {"name": "altitude", "unit": "meter", "display": ["foot", "kilometer"],
             "quantity": {"kind": "value", "series": "gps", "channel": "alt"}},
            {"name": "climb", "unit": "meters_per_second", "display": ["feet_per_second"],
             "quantity": {"kind": "rate", "series": "gps", "channel": "alt"}},
            {"name": "ground_speed", "unit": "meters_per_second", "display": ["miles_per_hour"],
             "quantity": {"kind": "magnitude", "series": "gps", "x": "east", "y": "north", "rate": true}},
            {"name": "course", "unit": "degree",
             "quantity": {"kind": "heading", "series": "gps", "north": "north", "east": "east"}},
            {"name": "pressure", "unit": "millibar", "display": ["kilopascal", "psi"],
             "quantity": {"kind": "value", "series": "slow", "channel": "pressure"}},
            {"name": "external", "unit": "celsius", "display": ["fahrenheit"], "scale": {"min": -60, "max": 40},
             "quantity": {"kind": "thermistor", "series": "slow", "channel": "thermistor",
                          "coefficients": {"a": 1.13e-3, "b": 2.34e-4, "c": 8.78e-8}}}
        ],
        "flags": [{"name": "heater", "series": "slow", "channel": "heater"}],
        "markers": [
            {"name": "balloon", "calibration": "map",
             "source": {"kind": "planar", "series": "gps", "x": "east", "y": "north"}}
        ],
        "charts": [
            {"name": "altitude", "readout": "altitude", "duration_seconds": 20},
            {"name": "external", "readout": "external", "duration_seconds": 60,
             "sampling": "record", "sample_rate": 0.2}
        ],
        "mission_clock": {"release_time": 10, "release_wall_clock": "12:02:12"}
    }))?;

    let mut engine = OverlayEngine::new(&config, &series)?;

    let frames = engine.run(|frame| -> Result<()> {
        if frame.index % 10 != 0 {
            return Ok(());
        }
        let alt = frame.readout("altitude").and_then(|r| r.in_unit(Unit::Foot));
        let course = frame.readout("course").and_then(|r| r.value);
        let temp = frame.readout("external").and_then(|r| r.value);
        let marker = frame.marker("balloon").and_then(|m| m.position);
        info!(
            "{} {} alt={:?}ft course={:?} temp={:?}C heater={:?} marker={:?}",
            frame.wall_clock.as_deref().unwrap_or("-"),
            frame.mission_elapsed.as_deref().unwrap_or("-"),
            alt,
            course,
            temp,
            frame.flag("heater"),
            marker
        );
        Ok(())
    })?;

    info!("{} visible frames, {} ticked", frames, engine.ticks());
    Ok(())
}
