/// Low-level failures while reading primitives off a flow byte stream.
///
/// Every variant that can be traced to a position carries the byte
/// offset from the start of the stream, so a truncated or corrupt
/// producer payload can be located with a hex dump.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Varint encoding exceeded 10 bytes without terminating.
    #[error("varint too long at offset {offset}: exceeded 10-byte limit")]
    VarintTooLong { offset: usize },

    /// A decoded varint does not fit the integer width it was read as.
    #[error("varint at offset {offset} overflows {width}")]
    VarintOverflow { offset: usize, width: &'static str },

    /// Input ended before a complete primitive could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {value:#04X} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },
}
