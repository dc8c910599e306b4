/// Errors that can occur while producing a flow payload.
///
/// ```text
///   EncodeError
///   ├── InvalidPayloadTarget ← with_payload called before any event
///   └── Io(std::io::Error)   ← from the gzip / zstd writers
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("with_payload called but no events have been added yet")]
    InvalidPayloadTarget,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
