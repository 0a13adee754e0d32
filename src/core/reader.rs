// Series file loading

use crate::core::compression::decompress;
use crate::core::constants::{CompressionType, F64_SIZE};
use crate::core::error::{Result, TelemetryError};
use crate::core::format::SampleSeries;
use crate::models::overlay_model::{SeriesConfig, SeriesFormat};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Flag(bool),
}

impl From<Cell> for f64 {
    fn from(cell: Cell) -> f64 {
        match cell {
            Cell::Number(v) => v,
            Cell::Flag(true) => 1.0,
            Cell::Flag(false) => 0.0,
        }
    }
}

/// Reads one series file, resolving relative paths against `base_dir`.
pub fn load_series(config: &SeriesConfig, base_dir: &Path) -> Result<SampleSeries> {
    let path = base_dir.join(&config.path);
    let compression = config.compression.unwrap_or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(CompressionType::from_extension)
            .unwrap_or(CompressionType::None)
    });

    let raw = fs::read(&path)?;
    let bytes = decompress(&raw, compression)?;
    debug!(
        "{}: {} bytes ({:?}, {} decompressed)",
        path.display(),
        raw.len(),
        compression,
        bytes.len()
    );

    let data = decode(&config.name, &bytes, config.format)?;
    let series = SampleSeries::new(config.name.clone(), config.channels.clone(), data)?;

    info!(
        "Loaded series '{}': {} records, t=[{}, {}]",
        series.name(),
        series.len(),
        series.first_timestamp(),
        series.last_timestamp()
    );

    Ok(series)
}

pub fn load_all(configs: &[SeriesConfig], base_dir: &Path) -> Result<Vec<SampleSeries>> {
    configs.iter().map(|c| load_series(c, base_dir)).collect()
}

/// Decodes a flat value array.
pub fn decode(name: &str, bytes: &[u8], format: SeriesFormat) -> Result<Vec<f64>> {
    match format {
        SeriesFormat::Json => {
            let cells: Vec<Cell> = serde_json::from_slice(bytes)?;
            Ok(cells.into_iter().map(f64::from).collect())
        }
        SeriesFormat::F64le => {
            if bytes.len() % F64_SIZE != 0 {
                return Err(TelemetryError::malformed(
                    name,
                    format!("{} bytes is not a whole number of f64 values", bytes.len()),
                ));
            }
            Ok(bytes
                .chunks_exact(F64_SIZE)
                .map(|chunk| {
                    let mut buf = [0u8; F64_SIZE];
                    buf.copy_from_slice(chunk);
                    f64::from_le_bytes(buf)
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::ChannelMetadata;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("saros_overlay_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(path: &str, format: SeriesFormat) -> SeriesConfig {
        SeriesConfig {
            name: "slow".to_string(),
            path: PathBuf::from(path),
            channels: vec![ChannelMetadata::new("pressure"), ChannelMetadata::discrete("heater")],
            format,
            compression: None,
        }
    }

    #[test]
    fn test_decode_json_with_flags() {
        let values = decode("slow", b"[0, 1013.25, false, 1, 1012.75, true]", SeriesFormat::Json).unwrap();
        assert_eq!(values, vec![0.0, 1013.25, 0.0, 1.0, 1012.75, 1.0]);
    }

    #[test]
    fn test_decode_f64le() {
        let bytes: Vec<u8> = [0.5f64, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(decode("gps", &bytes, SeriesFormat::F64le).unwrap(), vec![0.5, -2.0]);

        let err = decode("gps", &bytes[..11], SeriesFormat::F64le).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedSeries { .. }));
    }

    #[test]
    fn test_load_json_file() {
        let dir = scratch_dir("json");
        fs::write(dir.join("slow.json"), "[0, 1013.25, false, 1, 1012.75, true]").unwrap();

        let series = load_series(&config("slow.json", SeriesFormat::Json), &dir).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.value(1, 1), 1.0);
    }

    #[test]
    fn test_load_zlib_by_extension() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = scratch_dir("zlib");
        let bytes: Vec<u8> = [0.0f64, 1013.25, 0.0, 1.0, 1012.75, 1.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        fs::write(dir.join("slow.f64.zz"), encoder.finish().unwrap()).unwrap();

        let series = load_series(&config("slow.f64.zz", SeriesFormat::F64le), &dir).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.value(0, 0), 1013.25);
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn test_load_lz4_frame_by_extension() {
        use std::io::Write;

        let dir = scratch_dir("lz4");
        let mut encoder = lz4::EncoderBuilder::new().build(Vec::new()).unwrap();
        encoder.write_all(b"[0, 1013.25, false, 1, 1012.75, true]").unwrap();
        let (compressed, result) = encoder.finish();
        result.unwrap();
        fs::write(dir.join("slow.json.lz4"), compressed).unwrap();

        let series = load_series(&config("slow.json.lz4", SeriesFormat::Json), &dir).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.value(1, 0), 1012.75);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        let err = load_series(&config("nope.json", SeriesFormat::Json), &dir).unwrap_err();
        assert!(matches!(err, TelemetryError::Io(_)));
    }

    #[test]
    fn test_bad_stride_is_rejected_at_load() {
        let dir = scratch_dir("stride");
        fs::write(dir.join("slow.json"), "[0, 1013.25, false, 1]").unwrap();
        let err = load_series(&config("slow.json", SeriesFormat::Json), &dir).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedSeries { .. }));
    }
}
