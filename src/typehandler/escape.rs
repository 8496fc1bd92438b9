/*
    beanio
    https://github.com/beanio-rs/beanio

    src/typehandler/escape.rs

    Backslash-escaping string handler: `\\`, `\n`, `\r`, `\t`, `\f`, and (if
    `null_escaping_enabled`) `\0` -> NUL; any other `\x` decodes to `x`. This
    is parse-only — `format` returns `FieldError::FormatNotSupported`
    rather than re-escaping. The asymmetry is deliberate, not an oversight;
    see `DESIGN.md`.
*/

use crate::error::FieldError;
use crate::typehandler::TypeHandler;
use crate::value::Value;

#[derive(Debug, Clone, Copy)]
pub struct EscapingStringHandler {
    pub escape_char: char,
    pub null_escaping_enabled: bool,
}

impl EscapingStringHandler {
    pub fn new(escape_char: char, null_escaping_enabled: bool) -> Self {
        EscapingStringHandler {
            escape_char,
            null_escaping_enabled,
        }
    }
}

impl TypeHandler for EscapingStringHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c != self.escape_char {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('f') => out.push('\u{000C}'),
                Some('0') if self.null_escaping_enabled => out.push('\0'),
                Some(other) => out.push(other),
                None => out.push(self.escape_char),
            }
        }
        Ok(Value::String(out))
    }

    fn format(&self, _value: &Value) -> Result<String, FieldError> {
        Err(FieldError::FormatNotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_standard_escapes() {
        let handler = EscapingStringHandler::new('\\', false);
        let value = handler.parse("a\\nb\\tc\\\\d").unwrap();
        assert_eq!(value, Value::String("a\nb\tc\\d".to_string()));
    }

    #[test]
    fn null_escape_requires_flag() {
        let off = EscapingStringHandler::new('\\', false);
        assert_eq!(off.parse("x\\0y").unwrap(), Value::String("x0y".to_string()));

        let on = EscapingStringHandler::new('\\', true);
        assert_eq!(on.parse("x\\0y").unwrap(), Value::String("x\0y".to_string()));
    }

    #[test]
    fn format_is_unsupported() {
        let handler = EscapingStringHandler::new('\\', false);
        assert!(matches!(
            handler.format(&Value::String("x".into())),
            Err(FieldError::FormatNotSupported)
        ));
    }
}
