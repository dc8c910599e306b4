#![warn(clippy::pedantic)]

pub mod decoder;
pub mod decompression;
pub mod error;
pub mod value_reader;

pub use decoder::FlowDecoder;
pub use decompression::{DecompressError, MAX_DECOMPRESSED_SIZE, decode_flow_data};
pub use error::DecodeError;
pub use value_reader::{MAX_DEPTH, ValueReader};
