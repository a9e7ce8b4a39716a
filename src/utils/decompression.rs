use std::io::Read;

use bytes::Bytes;
use tracing::debug;

use crate::errors::{SourceError, SourceResult};

/// Supported compression formats detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

/// Magic file detection and decompression utility
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        match infer::get(data).map(|kind| kind.mime_type()) {
            Some("application/gzip") => CompressionFormat::Gzip,
            _ => CompressionFormat::Uncompressed,
        }
    }

    /// Inflate a payload the source declared as gzip.
    ///
    /// The payload must carry the gzip header; anything else is a decompression error.
    pub fn decompress_gzip(data: Bytes) -> SourceResult<Bytes> {
        if Self::detect_compression_format(&data) != CompressionFormat::Gzip {
            return Err(SourceError::decompression(
                "payload declared as gzip does not start with a gzip header",
            ));
        }
        Self::inflate(data)
    }

    /// Inflate the payload only when its magic bytes say it is gzip
    pub fn decompress_if_needed(data: Bytes) -> SourceResult<(Bytes, CompressionFormat)> {
        let format = Self::detect_compression_format(&data);
        debug!("Detected compression format: {:?}", format);
        match format {
            CompressionFormat::Gzip => Ok((Self::inflate(data)?, format)),
            CompressionFormat::Uncompressed => Ok((data, format)),
        }
    }

    #[cfg(feature = "compression-gzip")]
    fn inflate(data: Bytes) -> SourceResult<Bytes> {
        let mut decoder = flate2::read::MultiGzDecoder::new(data.as_ref());
        let mut decompressed = Vec::with_capacity(data.len().saturating_mul(4));
        decoder.read_to_end(&mut decompressed).map_err(|e| {
            SourceError::decompression(format!("Failed to decompress gzip data: {e}"))
        })?;
        debug!(
            "Decompressed {} bytes of gzip data into {} bytes",
            data.len(),
            decompressed.len()
        );
        Ok(Bytes::from(decompressed))
    }

    #[cfg(not(feature = "compression-gzip"))]
    fn inflate(_data: Bytes) -> SourceResult<Bytes> {
        Err(SourceError::decompression(
            "gzip support is not enabled (build with the compression-gzip feature)",
        ))
    }
}
