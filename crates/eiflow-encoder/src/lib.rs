#![warn(clippy::pedantic)]

pub mod compression;
pub mod encoder;
pub mod error;
pub mod value_writer;

pub use compression::Compression;
pub use encoder::{FlowEncoder, encode_value};
pub use error::EncodeError;
pub use value_writer::ValueWriter;
