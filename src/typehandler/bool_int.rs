/*
    beanio
    https://github.com/beanio-rs/beanio

    src/typehandler/bool_int.rs

    Boolean-as-integer handler: an integer equal to `true_value` parses to
    `true`, equal to `false_value` parses to `false`, anything else fails;
    `format` emits the configured literal back.
*/

use crate::error::FieldError;
use crate::typehandler::TypeHandler;
use crate::value::Value;

#[derive(Debug, Clone, Copy)]
pub struct BoolAsIntHandler {
    pub true_value: i64,
    pub false_value: i64,
}

impl BoolAsIntHandler {
    pub fn new(true_value: i64, false_value: i64) -> Self {
        BoolAsIntHandler {
            true_value,
            false_value,
        }
    }
}

impl TypeHandler for BoolAsIntHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        let n: i64 = text.trim().parse().map_err(|e| FieldError::TypeConversion {
            record: String::new(),
            field: String::new(),
            line: 0,
            text: text.to_string(),
            cause: format!("not an integer: {e}"),
        })?;
        if n == self.true_value {
            Ok(Value::Bool(true))
        } else if n == self.false_value {
            Ok(Value::Bool(false))
        } else {
            Err(FieldError::TypeConversion {
                record: String::new(),
                field: String::new(),
                line: 0,
                text: text.to_string(),
                cause: format!(
                    "expected {} or {} for a boolean-as-integer field",
                    self.true_value, self.false_value
                ),
            })
        }
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        match value {
            Value::Bool(true) => Ok(self.true_value.to_string()),
            Value::Bool(false) => Ok(self.false_value.to_string()),
            other => Ok(other.to_string()),
        }
    }
}
