use eiflow_types::{FlowStructure, Value};

use crate::decompression::{self, MAX_DECOMPRESSED_SIZE};
use crate::error::DecodeError;
use crate::value_reader::{MAX_DEPTH, ValueReader};

/// Flow decoder: the codec context for one worker.
///
/// Parses a complete in-memory flow payload into a [`FlowStructure`]. It
/// is the inverse of `FlowEncoder::encode` from the `eiflow-encoder`
/// crate.
///
/// Decoding proceeds in three steps:
///
///   1. **Flow data** (optional): base64 text is decoded and, when the
///      envelope says so, inflated into a scratch buffer owned by the
///      decoder.
///   2. **Value tree**: the bytes are walked as one tagged root value;
///      any bytes after it are an error.
///   3. **Shape**: the root is interpreted as `{host, events, payloads}`.
///
/// The scratch buffer is reused across calls, which is why decoding
/// takes `&mut self`. Share nothing between workers: give each its own
/// decoder.
///
/// # Example
///
/// ```rust
/// use eiflow_decoder::FlowDecoder;
/// use eiflow_encoder::FlowEncoder;
/// use eiflow_types::Value;
///
/// let bytes = FlowEncoder::new("h1")
///     .add_event(vec![Value::from("a")])
///     .encode()
///     .unwrap();
///
/// let flow = FlowDecoder::new().decode(&bytes).unwrap();
/// assert_eq!(flow.len(), 1);
/// ```
#[derive(Debug)]
pub struct FlowDecoder {
    max_decompressed: usize,
    max_depth: usize,
    scratch: Vec<u8>,
}

impl FlowDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_DECOMPRESSED_SIZE)
    }

    /// A decoder that refuses to inflate flow data past `max_decompressed`
    /// bytes.
    #[must_use]
    pub fn with_limit(max_decompressed: usize) -> Self {
        Self {
            max_decompressed,
            max_depth: MAX_DEPTH,
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// A fresh decoder with the same limits and its own scratch space.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self::with_limit(self.max_decompressed).with_max_depth(self.max_depth)
    }

    #[must_use]
    pub fn max_decompressed(&self) -> usize {
        self.max_decompressed
    }

    /// Decode structure bytes into a flow.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] from the value reader, or
    /// [`DecodeError::Type`] if the tree is not shaped like a flow.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<FlowStructure, DecodeError> {
        let root = self.decode_value(bytes)?;
        Ok(FlowStructure::from_value(root)?)
    }

    /// Decode structure bytes into a generic value tree without
    /// interpreting its shape.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] from the value reader, including
    /// [`DecodeError::TrailingData`].
    pub fn decode_value(&mut self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut reader = ValueReader::with_max_depth(bytes, self.max_depth);
        let root = reader.read_value()?;
        reader.finish()?;
        Ok(root)
    }

    /// Decode the text of a `flowData` attribute all the way to a flow.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Decompress`] for the text layer, otherwise as
    /// [`decode`](Self::decode).
    pub fn decode_flow_data(
        &mut self,
        raw: &str,
        compressed: bool,
    ) -> Result<FlowStructure, DecodeError> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = decompression::decode_flow_data_into(
            raw,
            compressed,
            self.max_decompressed,
            &mut scratch,
        )
        .map_err(DecodeError::from)
        .and_then(|()| self.decode(&scratch));
        self.scratch = scratch;
        result
    }
}

impl Default for FlowDecoder {
    fn default() -> Self {
        Self::new()
    }
}
