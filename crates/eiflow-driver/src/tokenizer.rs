use tracing::debug;

use crate::emit::{EventSink, FanOut, ProcessingMode};
use crate::error::{ConfigError, EventError, ProcessError};
use crate::event::{StreamDefinition, StreamEvent};
use crate::schema::AttributeType;
use crate::value::AttributeValue;

/// Name of the single output attribute.
pub const TOKEN_ATTRIBUTE: &str = "token";

/// Splits a comma-separated string attribute into one event per entity.
///
/// `"a,b,c"` on one input event produces three output events carrying
/// `a`, `b` and `c`. A null attribute, or the literal text `null`,
/// produces nothing.
#[derive(Debug)]
pub struct EntityTokenizer {
    context: String,
    input_index: usize,
    fan_out: FanOut,
}

impl EntityTokenizer {
    /// Bind the tokenizer to its one string argument.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ArgumentCount`] unless exactly one argument.
    /// - [`ConfigError::UnknownAttribute`] if it is not in `input`.
    /// - [`ConfigError::AttributeType`] if it is not a string.
    pub fn initialize(
        context: &str,
        input: &StreamDefinition,
        arguments: &[&str],
    ) -> Result<Self, ConfigError> {
        let [name] = arguments else {
            return Err(ConfigError::ArgumentCount {
                expected: 1,
                found: arguments.len(),
            });
        };
        let input_index = input
            .index_of(name)
            .ok_or_else(|| ConfigError::UnknownAttribute {
                name: (*name).to_string(),
                stream: input.id.clone(),
            })?;
        let declared = input
            .attribute_type(input_index)
            .unwrap_or(AttributeType::String);
        if declared != AttributeType::String {
            return Err(ConfigError::AttributeType {
                name: (*name).to_string(),
                expected: AttributeType::String,
                found: declared,
            });
        }

        Ok(Self {
            context: context.to_string(),
            input_index,
            fan_out: FanOut::new(),
        })
    }

    /// Emit one event per token of every input event, as one batch.
    /// Returns the number of events delivered.
    ///
    /// # Errors
    ///
    /// [`ProcessError`] if an input event holds a non-string value; the
    /// sink receives nothing in that case.
    pub fn process(
        &mut self,
        chunk: &[StreamEvent],
        sink: &mut dyn EventSink,
    ) -> Result<usize, ProcessError> {
        for (event_index, event) in chunk.iter().enumerate() {
            let text = match event.data.get(self.input_index) {
                None | Some(AttributeValue::Null) => continue,
                Some(AttributeValue::String(text)) => text,
                Some(other) => {
                    self.fan_out.discard();
                    return Err(ProcessError {
                        context: self.context.clone(),
                        event_index,
                        source: EventError::AttributeValue {
                            name: TOKEN_ATTRIBUTE,
                            expected: AttributeType::String,
                            found: other.kind(),
                        },
                    });
                }
            };
            if text == "null" {
                continue;
            }

            let tokens = split_tokens(text);
            debug!(context = %self.context, tokens = tokens.len(), "tokenized");
            for token in tokens {
                self.fan_out
                    .push(event.with_output(vec![AttributeValue::from(token)]));
            }
        }
        Ok(self.fan_out.flush(sink))
    }

    /// Output attributes: a single string `token`.
    #[must_use]
    pub fn output_attributes(&self) -> [(&'static str, AttributeType); 1] {
        [(TOKEN_ATTRIBUTE, AttributeType::String)]
    }

    #[must_use]
    pub fn processing_mode(&self) -> ProcessingMode {
        ProcessingMode::Slide
    }
}

/// Split on `,`. With no comma the text is the single token; otherwise
/// trailing empty tokens are dropped.
fn split_tokens(text: &str) -> Vec<&str> {
    if !text.contains(',') {
        return vec![text];
    }
    let mut tokens: Vec<&str> = text.split(',').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::BatchCollector;

    fn tokenizer() -> EntityTokenizer {
        let input = StreamDefinition::new("tweets").attribute("entities", AttributeType::String);
        EntityTokenizer::initialize("tok", &input, &["entities"]).unwrap()
    }

    fn run(values: Vec<AttributeValue>) -> Vec<String> {
        let chunk: Vec<_> = values
            .into_iter()
            .map(|v| StreamEvent::new(0, vec![v]))
            .collect();
        let mut sink = BatchCollector::new();
        tokenizer().process(&chunk, &mut sink).unwrap();
        sink.events()
            .map(|e| e.output[0].to_string())
            .collect()
    }

    #[test]
    fn splits_on_commas() {
        assert_eq!(run(vec!["a,b,c".into()]), ["a", "b", "c"]);
    }

    #[test]
    fn null_literal_and_null_value_emit_nothing() {
        assert!(run(vec!["null".into(), AttributeValue::Null]).is_empty());
    }

    #[test]
    fn trailing_empty_tokens_dropped() {
        assert_eq!(split_tokens("a,,b,,"), ["a", "", "b"]);
        assert!(split_tokens(",,").is_empty());
        assert_eq!(split_tokens(""), [""]);
    }

    #[test]
    fn chunk_tokens_arrive_in_one_batch() {
        let chunk = vec![
            StreamEvent::new(1, vec!["x,y".into()]),
            StreamEvent::new(2, vec!["z".into()]),
        ];
        let mut sink = BatchCollector::new();
        assert_eq!(tokenizer().process(&chunk, &mut sink).unwrap(), 3);
        assert_eq!(sink.batches.len(), 1);
        assert_eq!(sink.batches[0][2].timestamp, 2);
    }

    #[test]
    fn non_string_value_is_an_error() {
        let mut sink = BatchCollector::new();
        let chunk = vec![
            StreamEvent::new(1, vec!["ok".into()]),
            StreamEvent::new(2, vec![AttributeValue::Int(3)]),
        ];
        let err = tokenizer().process(&chunk, &mut sink).unwrap_err();
        assert_eq!(err.event_index, 1);
        assert!(sink.batches.is_empty());
    }

    #[test]
    fn exactly_one_string_argument() {
        let input = StreamDefinition::new("s")
            .attribute("a", AttributeType::String)
            .attribute("n", AttributeType::Int);
        assert!(matches!(
            EntityTokenizer::initialize("t", &input, &["a", "n"]),
            Err(ConfigError::ArgumentCount { expected: 1, found: 2 })
        ));
        assert!(matches!(
            EntityTokenizer::initialize("t", &input, &["n"]),
            Err(ConfigError::AttributeType { .. })
        ));
    }

    #[test]
    fn declares_token_output() {
        assert_eq!(
            tokenizer().output_attributes(),
            [("token", AttributeType::String)]
        );
    }
}
