#![warn(clippy::pedantic)]

pub mod error;
pub mod reader;
pub mod varint;

pub use error::WireError;
pub use reader::WireReader;
