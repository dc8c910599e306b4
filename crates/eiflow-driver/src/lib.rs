#![warn(clippy::pedantic)]

pub mod config;
pub mod emit;
pub mod error;
pub mod event;
pub mod expand;
pub mod layout;
pub mod processor;
pub mod schema;
pub mod tokenizer;
pub mod value;

pub use config::{DefinitionSource, ProcessorConfig};
pub use emit::{BatchCollector, EventSink, FanOut, ProcessingMode};
pub use error::{ConfigError, EventError, ExpandError, ProcessError};
pub use event::{Envelope, EventKind, InputBindings, InputRole, StreamDefinition, StreamEvent};
pub use expand::{OutputRow, RowExpander};
pub use layout::EventLayout;
pub use processor::DecompressProcessor;
pub use schema::{AttributeType, OutputSchema};
pub use tokenizer::EntityTokenizer;
pub use value::AttributeValue;
