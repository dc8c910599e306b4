/// Version of the registration table below.
///
/// Bump only when a registration is *added*. Existing ids are frozen:
/// every producer that has ever emitted a flow payload wrote these
/// numbers, and reassigning one silently corrupts all of them.
pub const REGISTRY_VERSION: u16 = 1;

/// Offset between a registration id and its on-wire tag.
///
/// Tag `0` is the null marker and tag `1` is reserved, so registration
/// id `n` is written as varint `n + 2`.
pub const TAG_OFFSET: u64 = 2;

/// Wire tag for a null value.
pub const NULL_TAG: u64 = 0;

/// Structural and primitive types that can appear in a flow payload.
///
/// Each variant has a fixed registration id shared by encoder and decoder.
///
/// ```text
/// ┌──────────┬─────┬──────┬──────────────────────────────────────┐
/// │ Variant  │ Id  │ Tag  │ Payload                              │
/// ├──────────┼─────┼──────┼──────────────────────────────────────┤
/// │ Int      │   0 │    2 │ zigzag varint (i32)                  │
/// │ String   │   1 │    3 │ varint len + UTF-8 bytes             │
/// │ Float    │   2 │    4 │ 4 bytes BE                           │
/// │ Bool     │   3 │    5 │ 1 byte                               │
/// │ Long     │   7 │    9 │ zigzag varint (i64)                  │
/// │ Double   │   8 │   10 │ 8 bytes BE                           │
/// │ Map      │ 111 │  113 │ varint count + (key, value) pairs    │
/// │ List     │ 222 │  224 │ varint count + values                │
/// │ Payload  │ 333 │  335 │ varint count + (name, value) pairs   │
/// └──────────┴─────┴──────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeId {
    Int,
    String,
    Float,
    Bool,
    Long,
    Double,
    Map,
    List,
    Payload,
}

/// Every registration, in id order. Encoder and decoder both derive
/// their lookups from this table.
pub const REGISTRATION_TABLE: [(TypeId, u32); 9] = [
    (TypeId::Int, 0),
    (TypeId::String, 1),
    (TypeId::Float, 2),
    (TypeId::Bool, 3),
    (TypeId::Long, 7),
    (TypeId::Double, 8),
    (TypeId::Map, 111),
    (TypeId::List, 222),
    (TypeId::Payload, 333),
];

impl TypeId {
    /// The frozen registration id.
    #[must_use]
    pub fn registration_id(self) -> u32 {
        match self {
            Self::Int => 0,
            Self::String => 1,
            Self::Float => 2,
            Self::Bool => 3,
            Self::Long => 7,
            Self::Double => 8,
            Self::Map => 111,
            Self::List => 222,
            Self::Payload => 333,
        }
    }

    /// Look up a registration id. Returns `None` for ids this version
    /// does not know.
    #[must_use]
    pub fn from_registration_id(id: u32) -> Option<Self> {
        REGISTRATION_TABLE
            .iter()
            .find(|(_, registered)| *registered == id)
            .map(|(type_id, _)| *type_id)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Long => "long",
            Self::Double => "double",
            Self::Map => "map",
            Self::List => "list",
            Self::Payload => "payload",
        }
    }
}

/// The leading varint of every encoded value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireTag {
    Null,
    Value(TypeId),
}

impl WireTag {
    /// Interpret a raw tag varint. Returns `None` for the reserved tag
    /// and for unregistered ids.
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        if raw == NULL_TAG {
            return Some(Self::Null);
        }
        let id = raw.checked_sub(TAG_OFFSET)?;
        let id = u32::try_from(id).ok()?;
        TypeId::from_registration_id(id).map(Self::Value)
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        match self {
            Self::Null => NULL_TAG,
            Self::Value(type_id) => u64::from(type_id.registration_id()) + TAG_OFFSET,
        }
    }
}
