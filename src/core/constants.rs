// Conversion factors and engine defaults

// Pressure, from millibar
pub const MBAR_TO_KPA: f64 = 0.1;
pub const MBAR_TO_PSI: f64 = 0.0145;
pub const MBAR_TO_ATM: f64 = 9.869e-4;
pub const MBAR_TO_INHG: f64 = 0.02953;

// Distance, from meters
pub const M_TO_FT: f64 = 3.281;
pub const M_TO_KM: f64 = 0.001;
pub const M_TO_MI: f64 = 6.214e-4;

// Speed, from meters per second
pub const MPS_TO_FTPS: f64 = 3.281;
pub const MPS_TO_KPH: f64 = 3.6;
pub const MPS_TO_MPH: f64 = 2.237;

pub const KELVIN_OFFSET: f64 = 273.15;

// Thermistor divider: supply(3.3V) -- NTC -- Vout -- R_ref(100k) -- GND
pub const THERMISTOR_SUPPLY_VOLTS: f64 = 3.3;
pub const THERMISTOR_REFERENCE_OHMS: f64 = 100_000.0;

// Below this ground speed (0.2 mph) the course is not meaningful
pub const MIN_COURSE_GROUND_SPEED: f64 = 0.0894;

// Kinematic projector time base: minutes
/// Upper bound on samples held by one chart.
pub const MAX_CHART_SAMPLES: f64 = 10_000_000.0;

pub const PROJECTOR_SECONDS_PER_UNIT: f64 = 60.0;

pub const F64_SIZE: usize = 8;

pub const DEFAULT_CONFIG_PATH: &str = "overlay.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionType {
    #[default]
    None,
    Zlib,
    Lz4,
    Zstd,
}

impl CompressionType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "zz" | "zlib" => Some(CompressionType::Zlib),
            "lz4" => Some(CompressionType::Lz4),
            "zst" | "zstd" => Some(CompressionType::Zstd),
            _ => None,
        }
    }
}
