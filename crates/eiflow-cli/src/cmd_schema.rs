/// Implementation of `eiflow schema`.
///
/// Loads an output definition, failing on any line the processor would
/// reject, and lists its fields in output order.
///
/// ```text
/// 20 fields
///    0  messageFlowId         string
///    1  host                  string
/// ...
/// ```
use anyhow::{Context, Result};
use eiflow_driver::{DefinitionSource, OutputSchema};

use crate::SchemaArgs;

/// Run the `eiflow schema` command.
///
/// # Errors
///
/// Returns an error if the definition cannot be read or is invalid.
pub fn run(args: &SchemaArgs) -> Result<()> {
    let source = args
        .definition
        .clone()
        .map_or(DefinitionSource::Bundled, DefinitionSource::File);
    let schema = OutputSchema::load(&source).context("invalid output definition")?;

    println!("{} fields", schema.len());
    for (idx, (name, ty)) in schema.attributes().enumerate() {
        println!("{idx:>4}  {name:<20}  {ty}");
    }
    Ok(())
}
