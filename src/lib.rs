// Telemetry overlay engine
// Resamples flight telemetry onto a video frame clock

pub mod core;
pub mod models;
pub mod state;
pub mod utils;

// Re-export main types
pub use crate::core::error::{Result, TelemetryError};
pub use crate::core::format::{ChannelKind, ChannelMetadata, SampleSeries};
pub use crate::core::reader::{load_all, load_series};
pub use crate::core::units::Unit;
pub use crate::models::overlay_model::OverlayConfig;
pub use crate::state::engine::OverlayEngine;
pub use crate::state::snapshot::FrameSnapshot;
pub use crate::utils::conf_helper::load_config;
