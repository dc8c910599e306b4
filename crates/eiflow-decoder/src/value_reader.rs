use eiflow_types::{PayloadRecord, TypeId, Value, WireTag};
use eiflow_wire::WireReader;
use indexmap::IndexMap;

use crate::error::DecodeError;

/// Deepest collection nesting accepted by default.
pub const MAX_DEPTH: usize = 64;

/// Cursor-based reader for tagged values.
///
/// `ValueReader` walks a flow byte stream one tagged value at a time,
/// recursing into lists, maps and payload records. Nesting is bounded
/// so a hostile stream cannot exhaust the stack.
///
/// # Usage pattern
///
/// ```text
///   let mut reader = ValueReader::new(bytes);
///   let root = reader.read_value()?;
///   reader.finish()?;   // reject trailing bytes
/// ```
pub struct ValueReader<'a> {
    wire: WireReader<'a>,
    max_depth: usize,
}

impl<'a> ValueReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_max_depth(buf, MAX_DEPTH)
    }

    #[must_use]
    pub fn with_max_depth(buf: &'a [u8], max_depth: usize) -> Self {
        Self {
            wire: WireReader::new(buf),
            max_depth,
        }
    }

    /// Read the next tagged value.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnknownTypeId`] for a tag outside the table.
    /// - [`DecodeError::NonStringKey`] for a map key of another type.
    /// - [`DecodeError::InvalidUtf8`] for malformed string bytes.
    /// - [`DecodeError::NestingTooDeep`] past the depth limit.
    /// - [`DecodeError::Wire`] for truncated or malformed primitives.
    pub fn read_value(&mut self) -> Result<Value, DecodeError> {
        self.read_at_depth(0)
    }

    /// Confirm the stream has been fully consumed.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TrailingData`] if bytes remain.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.wire.remaining() {
            0 => Ok(()),
            extra_bytes => Err(DecodeError::TrailingData { extra_bytes }),
        }
    }

    fn read_at_depth(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let offset = self.wire.position();
        let type_id = match self.read_tag()? {
            WireTag::Null => return Ok(Value::Null),
            WireTag::Value(type_id) => type_id,
        };

        let value = match type_id {
            TypeId::Int => Value::Int(self.wire.read_i32()?),
            TypeId::Long => Value::Long(self.wire.read_i64()?),
            TypeId::Float => Value::Float(self.wire.read_f32()?),
            TypeId::Double => Value::Double(self.wire.read_f64()?),
            TypeId::Bool => Value::Bool(self.wire.read_bool()?),
            TypeId::String => Value::String(self.read_str()?),
            TypeId::List | TypeId::Map | TypeId::Payload => {
                if depth >= self.max_depth {
                    return Err(DecodeError::NestingTooDeep {
                        limit: self.max_depth,
                        offset,
                    });
                }
                self.read_collection(type_id, depth + 1)?
            }
        };
        Ok(value)
    }

    fn read_collection(&mut self, type_id: TypeId, depth: usize) -> Result<Value, DecodeError> {
        let count = self.wire.read_len()?;
        // Every element takes at least one byte, so a count larger than
        // what is left is bogus; don't let it size the allocation.
        let capacity = count.min(self.wire.remaining());

        match type_id {
            TypeId::List => {
                let mut items = Vec::with_capacity(capacity);
                for _ in 0..count {
                    items.push(self.read_at_depth(depth)?);
                }
                Ok(Value::List(items))
            }
            TypeId::Map => {
                let mut entries = IndexMap::with_capacity(capacity);
                for _ in 0..count {
                    let key = self.read_key()?;
                    let value = self.read_at_depth(depth)?;
                    entries.insert(key, value);
                }
                Ok(Value::Map(entries))
            }
            _ => {
                let mut record = PayloadRecord {
                    fields: IndexMap::with_capacity(capacity),
                };
                for _ in 0..count {
                    let name = self.read_str()?;
                    let value = self.read_at_depth(depth)?;
                    record.fields.insert(name, value);
                }
                Ok(Value::Payload(record))
            }
        }
    }

    fn read_tag(&mut self) -> Result<WireTag, DecodeError> {
        let offset = self.wire.position();
        let tag = self.wire.read_varint()?;
        WireTag::from_raw(tag).ok_or(DecodeError::UnknownTypeId { tag, offset })
    }

    fn read_key(&mut self) -> Result<String, DecodeError> {
        let offset = self.wire.position();
        match self.read_tag()? {
            WireTag::Value(TypeId::String) => self.read_str(),
            WireTag::Null => Err(DecodeError::NonStringKey {
                offset,
                found: "null",
            }),
            WireTag::Value(other) => Err(DecodeError::NonStringKey {
                offset,
                found: other.name(),
            }),
        }
    }

    fn read_str(&mut self) -> Result<String, DecodeError> {
        let offset = self.wire.position();
        let len = self.wire.read_len()?;
        let bytes = self.wire.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }
}
