use std::borrow::Cow;
use std::io::Read as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::MultiGzDecoder;

/// Default upper bound on the unpacked size of one flow payload (64 MiB).
///
/// A compressed stream that inflates past this is treated as a
/// decompression bomb rather than being read to the end.
pub const MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Errors raised while turning `flowData` text into structure bytes.
#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    /// The attribute was empty or only whitespace. Upstream never emits
    /// an empty flow, so this is a producer fault, not an empty result.
    #[error("flow data is empty")]
    EmptyPayload,

    #[error("flow data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("compressed flow data is neither gzip nor zstd")]
    UnrecognizedFormat,

    #[error("{codec} decompression failed: {source}")]
    DecompressFailed {
        codec: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("decompressed size exceeds limit {limit}")]
    DecompressionBomb { limit: usize },
}

/// Compression codecs recognised by magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Zstd,
}

impl Codec {
    /// Identify the codec from the leading bytes of a compressed stream.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&GZIP_MAGIC) {
            Some(Self::Gzip)
        } else if data.starts_with(&ZSTD_MAGIC) {
            Some(Self::Zstd)
        } else {
            None
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        }
    }
}

/// Decode the text of a `flowData` attribute into structure bytes.
///
/// The text is standard base64; ASCII whitespace is ignored. When
/// `compressed` is set the decoded bytes are a gzip or zstd stream and
/// are inflated, up to `limit` bytes.
///
/// # Errors
///
/// - [`DecompressError::EmptyPayload`] for empty text.
/// - [`DecompressError::InvalidBase64`] for malformed text.
/// - [`DecompressError::UnrecognizedFormat`] if `compressed` is set and
///   the bytes carry neither magic number.
/// - [`DecompressError::DecompressFailed`] for corrupt or truncated
///   streams.
/// - [`DecompressError::DecompressionBomb`] if the output exceeds `limit`.
pub fn decode_flow_data(
    raw: &str,
    compressed: bool,
    limit: usize,
) -> Result<Vec<u8>, DecompressError> {
    let mut out = Vec::new();
    decode_flow_data_into(raw, compressed, limit, &mut out)?;
    Ok(out)
}

/// Same as [`decode_flow_data`], writing into a reusable buffer.
///
/// `out` is cleared first. On error its contents are unspecified.
///
/// # Errors
///
/// As for [`decode_flow_data`].
pub fn decode_flow_data_into(
    raw: &str,
    compressed: bool,
    limit: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecompressError> {
    out.clear();
    let text = strip_whitespace(raw);
    if text.is_empty() {
        return Err(DecompressError::EmptyPayload);
    }

    if !compressed {
        STANDARD.decode_vec(&*text, out)?;
        return Ok(());
    }

    let packed = STANDARD.decode(&*text)?;
    let codec = Codec::sniff(&packed).ok_or(DecompressError::UnrecognizedFormat)?;
    inflate(codec, &packed, limit, out)
}

fn strip_whitespace(raw: &str) -> Cow<'_, [u8]> {
    if raw.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            raw.bytes()
                .filter(|b| !b.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(raw.as_bytes())
    }
}

fn inflate(
    codec: Codec,
    data: &[u8],
    limit: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecompressError> {
    let failed = |source| DecompressError::DecompressFailed {
        codec: codec.name(),
        source,
    };

    // Read one byte past the limit so an exact-limit stream still passes.
    let cap = (limit as u64).saturating_add(1);
    let read = match codec {
        Codec::Gzip => MultiGzDecoder::new(data).take(cap).read_to_end(out),
        Codec::Zstd => zstd::stream::read::Decoder::new(data)
            .and_then(|decoder| decoder.take(cap).read_to_end(out)),
    }
    .map_err(failed)?;

    if read > limit {
        return Err(DecompressError::DecompressionBomb { limit });
    }
    Ok(())
}
