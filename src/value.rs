/*
    beanio
    https://github.com/beanio-rs/beanio

    Copyright (c) 2026 The beanio-rs Contributors

    src/value.rs

    A tagged dynamic value, modeling an aggregate as an explicit enum
    rather than a reflected object, so type handlers and accessors trade in
    one concrete type rather than `dyn Any`.
*/

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;

/// A dynamically typed value flowing between type handlers, accessors, and
/// the property tree. `Object` carries a type tag only — the bean factory
/// and accessor registry (see [`crate::beanfactory`], [`crate::accessor`])
/// are responsible for turning a `Complex` property's gathered children into
/// an actual typed value the host application recognizes; this crate itself
/// never downcasts into arbitrary Rust types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Time(NaiveDateTime),
    Sequence(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// An aggregate constructed through the bean factory, tagged with the
    /// name the [`crate::config::BeanSpec`] registered it under.
    Object(String, BTreeMap<String, Value>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            Value::Object(_, m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            Value::Object(_, m) => Some(m),
            _ => None,
        }
    }

    /// The tag name used in diagnostics (`ConfigError`/`FieldError` messages)
    /// and by the bean factory's assignability checks.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Time(_) => "time",
            Value::Sequence(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object(..) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Time(t) => write!(f, "{t}"),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(_) | Value::Object(..) => write!(f, "{{object}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_null() {
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn display_sequence_joins_with_comma() {
        let seq = Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(seq.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn object_exposes_its_map() {
        let mut m = BTreeMap::new();
        m.insert("id".to_string(), Value::Int(5));
        let v = Value::Object("Widget".to_string(), m);
        assert_eq!(v.as_map().unwrap().get("id"), Some(&Value::Int(5)));
    }
}
