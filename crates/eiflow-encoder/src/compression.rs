use std::io::{Cursor, Write as _};

use flate2::write::GzEncoder;

/// Default zstd compression level (1–22 scale).
const ZSTD_LEVEL: i32 = 3;

/// gzip level used by producers of compressed flows.
const GZIP_LEVEL: flate2::Compression = flate2::Compression::new(6);

/// Codec applied to the encoded flow bytes before base64.
///
/// `None` produces the uncompressed wire form, which consumers read
/// with `meta_compressed = false`. Both other variants are read with
/// `meta_compressed = true`; the decoder tells them apart by magic
/// number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    None,
    #[default]
    Gzip,
    Zstd,
}

impl Compression {
    /// Value a producer should put in the `meta_compressed` attribute.
    #[must_use]
    pub fn is_compressed(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Apply this codec to `data`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the compressor fails.
    pub fn apply(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Gzip => compress_gzip(data),
            Self::Zstd => compress_zstd(data),
        }
    }
}

/// Compress data to gzip format.
///
/// # Errors
///
/// Propagates errors from the gzip writer.
pub fn compress_gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    // gzip header + footer is 18 bytes
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 18), GZIP_LEVEL);
    encoder.write_all(data)?;
    encoder.finish()
}

/// Compress data with zstd at the default level.
///
/// # Errors
///
/// Propagates errors from the zstd encoder.
pub fn compress_zstd(data: &[u8]) -> std::io::Result<Vec<u8>> {
    zstd::encode_all(Cursor::new(data), ZSTD_LEVEL)
}
