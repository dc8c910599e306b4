#![warn(clippy::pedantic)]

pub mod error;
pub mod payload;
pub mod structure;
pub mod type_id;
pub mod value;

pub use error::TypeError;
pub use payload::PayloadRecord;
pub use structure::FlowStructure;
pub use type_id::{REGISTRATION_TABLE, REGISTRY_VERSION, TypeId, WireTag};
pub use value::Value;
