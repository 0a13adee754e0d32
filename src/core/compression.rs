// Whole-file decompression for series files
//
// Every codec is read as a stream: zlib (`.zz`), LZ4 frame format (`.lz4`,
// as written by the `lz4` CLI) and zstd frames (`.zst`).

use crate::core::constants::CompressionType;
use crate::core::error::{Result, TelemetryError};
use flate2::read::ZlibDecoder;
use std::io::{self, Read};

fn failed(codec: &str, e: io::Error) -> TelemetryError {
    TelemetryError::DecompressionFailed(format!("{}: {}", codec, e))
}

fn drain(mut stream: impl Read, codec: &str) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    stream.read_to_end(&mut body).map_err(|e| failed(codec, e))?;
    Ok(body)
}

/// Decompresses a complete file body.
pub fn decompress(data: &[u8], compression: CompressionType) -> Result<Vec<u8>> {
    match compression {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Zlib => drain(ZlibDecoder::new(data), "zlib"),

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            let frame = lz4::Decoder::new(data).map_err(|e| failed("lz4", e))?;
            drain(frame, "lz4")
        }
        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(TelemetryError::UnsupportedCompression(
            "lz4 (built without the lz4 feature)".to_string(),
        )),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => {
            let frame = zstd::stream::read::Decoder::new(data).map_err(|e| failed("zstd", e))?;
            drain(frame, "zstd")
        }
        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(TelemetryError::UnsupportedCompression(
            "zstd (built without the zstd feature)".to_string(),
        )),
    }
}
