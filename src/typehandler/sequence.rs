/*
    beanio
    https://github.com/beanio-rs/beanio

    src/typehandler/sequence.rs

    Synthesized handler for a `FieldConfig` marked `is_collection`:
    delegates element conversion to the wrapped handler and splits/joins
    the field's raw text on `delimiter`, with `escape_char` escaping a
    literal delimiter or escape character inside an element.
*/

use std::sync::Arc;

use crate::error::FieldError;
use crate::typehandler::TypeHandler;
use crate::value::Value;

#[derive(Clone)]
pub struct SequenceHandler {
    element: Arc<dyn TypeHandler>,
    delimiter: char,
    escape_char: char,
}

impl SequenceHandler {
    pub fn new(element: Arc<dyn TypeHandler>, delimiter: char, escape_char: char) -> Self {
        SequenceHandler {
            element,
            delimiter,
            escape_char,
        }
    }

    fn split(&self, text: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == self.escape_char {
                match chars.next() {
                    Some(next) => current.push(next),
                    None => current.push(self.escape_char),
                }
            } else if c == self.delimiter {
                parts.push(std::mem::take(&mut current));
            } else {
                current.push(c);
            }
        }
        parts.push(current);
        parts
    }

    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if c == self.delimiter || c == self.escape_char {
                out.push(self.escape_char);
            }
            out.push(c);
        }
        out
    }
}

impl TypeHandler for SequenceHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        if text.is_empty() {
            return Ok(Value::Sequence(Vec::new()));
        }
        let elements = self
            .split(text)
            .iter()
            .map(|part| self.element.parse(part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Sequence(elements))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        let Value::Sequence(items) = value else {
            return self.element.format(value);
        };
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            parts.push(self.escape(&self.element.format(item)?));
        }
        Ok(parts.join(&self.delimiter.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typehandler::builtin::IntHandler;

    #[test]
    fn splits_and_joins_on_delimiter() {
        let handler = SequenceHandler::new(Arc::new(IntHandler), '|', '\\');
        let value = handler.parse("1|2|3").unwrap();
        assert_eq!(
            value,
            Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(handler.format(&value).unwrap(), "1|2|3");
    }

    #[test]
    fn empty_text_is_empty_sequence() {
        let handler = SequenceHandler::new(Arc::new(IntHandler), '|', '\\');
        assert_eq!(handler.parse("").unwrap(), Value::Sequence(Vec::new()));
    }
}
