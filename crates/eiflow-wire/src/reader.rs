use crate::error::WireError;
use crate::varint::{decode_varint, zigzag_decode_i32, zigzag_decode_i64};

/// Cursor over a flow byte stream.
///
/// `WireReader` wraps a byte slice and hands out primitives one at a
/// time, tracking the absolute offset so every error names the byte
/// position where the stream went wrong.
///
/// ```text
///   let mut reader = WireReader::new(bytes);
///   let tag = reader.read_varint()?;
///   let len = reader.read_len()?;
///   let text = reader.read_bytes(len)?;
/// ```
///
/// Fixed-width numbers are big-endian, matching the upstream producer.
#[derive(Clone, Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read an unsigned varint.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] or [`WireError::VarintTooLong`], with
    /// the offset rebased onto the whole stream.
    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        let start = self.pos;
        let (value, n) = decode_varint(&self.buf[start..]).map_err(|e| match e {
            WireError::UnexpectedEof { offset } => WireError::UnexpectedEof {
                offset: start + offset,
            },
            WireError::VarintTooLong { .. } => WireError::VarintTooLong { offset: start },
            other => other,
        })?;
        self.pos += n;
        Ok(value)
    }

    /// Read a varint that is used as a length or element count.
    ///
    /// # Errors
    ///
    /// Propagates varint errors, and [`WireError::VarintOverflow`] when the
    /// value cannot be addressed on this platform.
    pub fn read_len(&mut self) -> Result<usize, WireError> {
        let start = self.pos;
        let raw = self.read_varint()?;
        usize::try_from(raw).map_err(|_| WireError::VarintOverflow {
            offset: start,
            width: "usize",
        })
    }

    /// Read a zigzag-encoded `i32`.
    ///
    /// # Errors
    ///
    /// Propagates varint errors; [`WireError::VarintOverflow`] if the value
    /// is wider than 32 bits.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        let start = self.pos;
        let raw = self.read_varint()?;
        zigzag_decode_i32(raw).ok_or(WireError::VarintOverflow {
            offset: start,
            width: "i32",
        })
    }

    /// Read a zigzag-encoded `i64`.
    ///
    /// # Errors
    ///
    /// Propagates varint errors.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(zigzag_decode_i64(self.read_varint()?))
    }

    /// Read a big-endian IEEE-754 single.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian IEEE-754 double.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Read a single boolean byte (0 or 1).
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] at end of input,
    /// [`WireError::InvalidBool`] for any other byte value.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        let offset = self.pos;
        let [byte] = self.read_array::<1>()?;
        match byte {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(WireError::InvalidBool { offset, value }),
        }
    }

    /// Borrow the next `len` bytes.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(WireError::UnexpectedEof {
                offset: self.buf.len(),
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}
