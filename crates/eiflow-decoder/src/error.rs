use eiflow_types::TypeError;
use eiflow_wire::WireError;

use crate::decompression::DecompressError;

/// Errors that can occur while decoding a flow payload.
///
/// The decoder validates at three levels: the byte stream (varints,
/// truncation), the tagged value tree (registrations, keys, UTF-8,
/// depth, trailing bytes) and finally the flow shape.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── UnknownTypeId        ← tag not in the registration table
///   ├── NonStringKey         ← MAP key that is not a STRING
///   ├── InvalidUtf8          ← string or name bytes are not UTF-8
///   ├── NestingTooDeep       ← collections nested past the limit
///   ├── TrailingData         ← bytes left after the root value
///   ├── Decompress(..)       ← from the flow-data text layer
///   ├── Type(TypeError)      ← from eiflow-types shape extraction
///   └── Wire(WireError)      ← from eiflow-wire primitives
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream names a registration this version does not know.
    ///
    /// Producer and consumer disagree about the registration table,
    /// which is a version incompatibility rather than corruption.
    #[error("unknown type tag {tag} at offset {offset}")]
    UnknownTypeId { tag: u64, offset: usize },

    #[error("map key at offset {offset} is {found}, expected string")]
    NonStringKey { offset: usize, found: &'static str },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("collections nested deeper than {limit} at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },

    /// Extra bytes were found after the root value.
    #[error("unexpected data after root value ({extra_bytes} bytes)")]
    TrailingData { extra_bytes: usize },

    #[error(transparent)]
    Decompress(#[from] DecompressError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),
}
