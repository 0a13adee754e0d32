pub mod calibration;
pub mod clock;
pub mod compression;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod format;
pub mod interpolate;
pub mod mission_clock;
pub mod projector;
pub mod reader;
pub mod units;
pub mod window;
