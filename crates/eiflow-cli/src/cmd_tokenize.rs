/// Implementation of `eiflow tokenize`: one token per output line.
use anyhow::{Context, Result};
use eiflow_driver::{AttributeType, EntityTokenizer, StreamDefinition, StreamEvent};

use crate::TokenizeArgs;

/// Run the `eiflow tokenize` command.
///
/// # Errors
///
/// Returns an error if the tokenizer rejects the input.
pub fn run(args: &TokenizeArgs) -> Result<()> {
    let input = StreamDefinition::new("cli").attribute("entities", AttributeType::String);
    let mut tokenizer = EntityTokenizer::initialize("tokenize", &input, &["entities"])?;

    let event = StreamEvent::new(0, vec![args.text.as_str().into()]);
    let mut tokens = Vec::new();
    tokenizer
        .process(&[event], &mut |batch: Vec<StreamEvent>| tokens.extend(batch))
        .context("tokenize failed")?;

    for event in &tokens {
        for value in &event.output {
            println!("{value}");
        }
    }
    Ok(())
}
