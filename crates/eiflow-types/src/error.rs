/// Errors raised while interpreting a decoded value tree as a flow.
///
/// These sit above the byte-level decoder: the tree parsed fine, but
/// it does not have the shape of an aggregated flow.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────┐
/// │ Variant              │ Cause                                    │
/// ├──────────────────────┼──────────────────────────────────────────┤
/// │ MissingKey           │ host / events / payloads absent          │
/// │ UnexpectedShape      │ a known key holds the wrong value type   │
/// │ MisalignedPayloads   │ events and payloads differ in length     │
/// └──────────────────────┴──────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("flow is missing required key `{key}`")]
    MissingKey { key: &'static str },

    #[error("`{path}` should be {expected}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// `events[i]` and `payloads[i]` must describe the same component,
    /// so the two sequences have to be the same length.
    #[error("flow has {events} events but {payloads} payloads")]
    MisalignedPayloads { events: usize, payloads: usize },
}
