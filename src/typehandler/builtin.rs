/*
    beanio
    https://github.com/beanio-rs/beanio

    src/typehandler/builtin.rs

    The scalar handlers every `TypeHandlerRegistry::with_defaults()` seeds.
    Each is a plain stateless parse/format pair; none of them need the
    registry's format or name context, so they register at tier 4
    (`(type)`) and let more specific tiers override per stream.
*/

use crate::error::FieldError;
use crate::typehandler::TypeHandler;
use crate::value::Value;

fn conversion_error(type_name: &str, text: &str, cause: impl std::fmt::Display) -> FieldError {
    FieldError::TypeConversion {
        record: String::new(),
        field: String::new(),
        line: 0,
        text: text.to_string(),
        cause: format!("not a valid {type_name}: {cause}"),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringHandler;

impl TypeHandler for StringHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        Ok(Value::String(text.to_string()))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntHandler;

impl TypeHandler for IntHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        text.trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|e| conversion_error("int", text, e))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LongHandler;

impl TypeHandler for LongHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        text.trim()
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|e| conversion_error("long", text, e))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloatHandler;

impl TypeHandler for FloatHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        text.trim()
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|e| conversion_error("float", text, e))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoubleHandler;

impl TypeHandler for DoubleHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        text.trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| conversion_error("double", text, e))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoolHandler;

impl TypeHandler for BoolHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Ok(Value::Bool(true)),
            "false" | "f" | "0" | "no" | "n" => Ok(Value::Bool(false)),
            other => Err(conversion_error("bool", other, "unrecognized literal")),
        }
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        Ok(value.to_string())
    }
}

/// Raw byte fields, formatted/parsed as lossy UTF-8 text into
/// `Value::Bytes`.
#[derive(Debug, Clone, Copy)]
pub struct BytesHandler;

impl TypeHandler for BytesHandler {
    fn parse(&self, text: &str) -> Result<Value, FieldError> {
        Ok(Value::Bytes(text.as_bytes().to_vec()))
    }

    fn format(&self, value: &Value) -> Result<String, FieldError> {
        match value {
            Value::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
            other => Ok(other.to_string()),
        }
    }
}
