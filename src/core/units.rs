// Stateless unit conversions

use crate::core::constants::*;
use crate::core::error::{Result, TelemetryError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Millibar,
    Kilopascal,
    Psi,
    Atmosphere,
    InchMercury,
    Meter,
    Foot,
    Kilometer,
    Mile,
    MetersPerSecond,
    FeetPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Celsius,
    Fahrenheit,
    Degree,
    Volt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Pressure,
    Distance,
    Speed,
    Temperature,
    Angle,
    Voltage,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        use Unit::*;
        match self {
            Millibar | Kilopascal | Psi | Atmosphere | InchMercury => Dimension::Pressure,
            Meter | Foot | Kilometer | Mile => Dimension::Distance,
            MetersPerSecond | FeetPerSecond | KilometersPerHour | MilesPerHour => Dimension::Speed,
            Celsius | Fahrenheit => Dimension::Temperature,
            Degree => Dimension::Angle,
            Volt => Dimension::Voltage,
        }
    }

    pub fn symbol(self) -> &'static str {
        use Unit::*;
        match self {
            Millibar => "mBar",
            Kilopascal => "kPa",
            Psi => "psi",
            Atmosphere => "atm",
            InchMercury => "inHg",
            Meter => "m",
            Foot => "ft",
            Kilometer => "km",
            Mile => "mi",
            MetersPerSecond => "m/s",
            FeetPerSecond => "ft/s",
            KilometersPerHour => "kph",
            MilesPerHour => "mph",
            Celsius => "°C",
            Fahrenheit => "°F",
            Degree => "°",
            Volt => "V",
        }
    }

    // Multiplier from the dimension's base unit (mBar, m, m/s)
    fn factor(self) -> f64 {
        use Unit::*;
        match self {
            Kilopascal => MBAR_TO_KPA,
            Psi => MBAR_TO_PSI,
            Atmosphere => MBAR_TO_ATM,
            InchMercury => MBAR_TO_INHG,
            Foot => M_TO_FT,
            Kilometer => M_TO_KM,
            Mile => M_TO_MI,
            FeetPerSecond => MPS_TO_FTPS,
            KilometersPerHour => MPS_TO_KPH,
            MilesPerHour => MPS_TO_MPH,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64> {
    if from.dimension() != to.dimension() {
        return Err(TelemetryError::IncompatibleUnits {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    if from == to {
        return Ok(value);
    }

    Ok(match (from, to) {
        (Unit::Celsius, Unit::Fahrenheit) => c_to_f(value),
        (Unit::Fahrenheit, Unit::Celsius) => f_to_c(value),
        _ => value / from.factor() * to.factor(),
    })
}

pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Steinhart–Hart coefficients of an NTC thermistor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thermistor {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    #[serde(default = "default_reference")]
    pub reference_ohms: f64,
    #[serde(default = "default_supply")]
    pub supply_volts: f64,
}

fn default_reference() -> f64 {
    THERMISTOR_REFERENCE_OHMS
}

fn default_supply() -> f64 {
    THERMISTOR_SUPPLY_VOLTS
}

impl Thermistor {
    /// 10k NTC used on the external and lid probes.
    pub const NTC_10K: Thermistor = Thermistor {
        a: 1.13e-3,
        b: 2.34e-4,
        c: 8.78e-8,
        reference_ohms: THERMISTOR_REFERENCE_OHMS,
        supply_volts: THERMISTOR_SUPPLY_VOLTS,
    };

    /// 5k NTC used on the internal and camera probes.
    pub const NTC_5K: Thermistor = Thermistor {
        a: 1.29e-3,
        b: 2.36e-4,
        c: 9.52e-8,
        reference_ohms: THERMISTOR_REFERENCE_OHMS,
        supply_volts: THERMISTOR_SUPPLY_VOLTS,
    };

    /// Divider output voltage to degrees Celsius.
    ///
    /// Voltages at or outside the rails give a non-finite result.
    pub fn celsius(&self, voltage: f64) -> f64 {
        let r = self.reference_ohms * (self.supply_volts / voltage - 1.0);
        let ln_r = r.ln();
        1.0 / (self.a + self.b * ln_r + self.c * ln_r.powi(3)) - KELVIN_OFFSET
    }
}
