/*
    beanio
    https://github.com/beanio-rs/beanio

    src/typehandler/mod.rs

    `TypeHandler` converts between a field's raw text and a `Value`. The
    registry below resolves a handler for a `(type, format, name)` triple
    using a four-tier fallback:

        (type, format, name) -> (type, format) -> (type, name) -> (type)

    Concurrency: `with_defaults()` builds the builtin table once behind
    `once_cell::sync::Lazy` and clones its `Arc`s into every registry
    instance; further registration happens through `dashmap::DashMap`, so
    lookups stay lock-free under concurrent reads and duplicate inserts
    during a race just overwrite with an equivalent handler.
*/

pub mod bool_int;
pub mod builtin;
pub mod escape;
pub mod sequence;
pub mod xml_datetime;

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::error::FieldError;
use crate::value::Value;
use crate::StreamFormat;

/// Converts between a field's raw text and a [`Value`]. Implementations are
/// stateless and shared behind an `Arc`, so they must be `Send + Sync`.
pub trait TypeHandler: Send + Sync {
    /// Parse `text` into a `Value` of this handler's target type.
    fn parse(&self, text: &str) -> Result<Value, FieldError>;

    /// Format `value` back into text. Escaping handlers are parse-only and
    /// return [`FieldError::FormatNotSupported`] — a documented asymmetry,
    /// not a bug.
    fn format(&self, value: &Value) -> Result<String, FieldError>;
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct NamedKey {
    type_name: String,
    format: Option<StreamFormat>,
    name: String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct TypeKey {
    type_name: String,
    format: Option<StreamFormat>,
}

/// Concurrent, read-mostly handler registry.
#[derive(Clone)]
pub struct TypeHandlerRegistry {
    by_type: Arc<DashMap<TypeKey, Arc<dyn TypeHandler>>>,
    by_name: Arc<DashMap<NamedKey, Arc<dyn TypeHandler>>>,
}

impl TypeHandlerRegistry {
    /// An empty registry with no builtin handlers.
    pub fn new() -> Self {
        TypeHandlerRegistry {
            by_type: Arc::new(DashMap::new()),
            by_name: Arc::new(DashMap::new()),
        }
    }

    /// A registry seeded with the builtin scalar handlers.
    pub fn with_defaults() -> Self {
        static DEFAULTS: Lazy<Vec<(&'static str, Arc<dyn TypeHandler>)>> = Lazy::new(|| {
            vec![
                ("string", Arc::new(builtin::StringHandler) as Arc<dyn TypeHandler>),
                ("int", Arc::new(builtin::IntHandler)),
                ("long", Arc::new(builtin::LongHandler)),
                ("float", Arc::new(builtin::FloatHandler)),
                ("double", Arc::new(builtin::DoubleHandler)),
                ("bool", Arc::new(builtin::BoolHandler)),
                ("bytes", Arc::new(builtin::BytesHandler)),
                ("time", Arc::new(xml_datetime::XmlDateTimeHandler::time())),
                ("date", Arc::new(xml_datetime::XmlDateTimeHandler::date())),
                ("datetime", Arc::new(xml_datetime::XmlDateTimeHandler::date_time())),
            ]
        });

        let registry = TypeHandlerRegistry::new();
        for (type_name, handler) in DEFAULTS.iter() {
            registry.register_default(type_name, handler.clone());
        }
        registry
    }

    /// Registers `handler` as the fallback for `type_name` across every
    /// format (resolution tier 4).
    pub fn register_default(&self, type_name: impl Into<String>, handler: Arc<dyn TypeHandler>) {
        self.by_type.insert(
            TypeKey {
                type_name: type_name.into(),
                format: None,
            },
            handler,
        );
    }

    /// Registers `handler` for `type_name` restricted to `format`
    /// (resolution tier 2).
    pub fn register_for_format(
        &self,
        type_name: impl Into<String>,
        format: StreamFormat,
        handler: Arc<dyn TypeHandler>,
    ) {
        self.by_type.insert(
            TypeKey {
                type_name: type_name.into(),
                format: Some(format),
            },
            handler,
        );
    }

    /// Registers `handler` under an explicit `name`, usable from any field
    /// naming `name` as its `type_handler_name` regardless of format
    /// (resolution tier 3).
    pub fn register_named(
        &self,
        type_name: impl Into<String>,
        name: impl Into<String>,
        handler: Arc<dyn TypeHandler>,
    ) {
        self.by_name.insert(
            NamedKey {
                type_name: type_name.into(),
                format: None,
                name: name.into(),
            },
            handler,
        );
    }

    /// Registers `handler` under an explicit `name`, restricted to `format`
    /// (resolution tier 1, the highest-priority tier).
    pub fn register_named_for_format(
        &self,
        type_name: impl Into<String>,
        format: StreamFormat,
        name: impl Into<String>,
        handler: Arc<dyn TypeHandler>,
    ) {
        self.by_name.insert(
            NamedKey {
                type_name: type_name.into(),
                format: Some(format),
                name: name.into(),
            },
            handler,
        );
    }

    /// Resolves a handler for `type_name` given the stream's `format` and an
    /// optional explicit `name`, following the four-tier fallback order.
    pub fn resolve(
        &self,
        type_name: &str,
        format: StreamFormat,
        name: Option<&str>,
    ) -> Option<Arc<dyn TypeHandler>> {
        if let Some(name) = name {
            if let Some(handler) = self.by_name.get(&NamedKey {
                type_name: type_name.to_string(),
                format: Some(format),
                name: name.to_string(),
            }) {
                return Some(handler.clone());
            }
        }
        if let Some(handler) = self.by_type.get(&TypeKey {
            type_name: type_name.to_string(),
            format: Some(format),
        }) {
            return Some(handler.clone());
        }
        if let Some(name) = name {
            if let Some(handler) = self.by_name.get(&NamedKey {
                type_name: type_name.to_string(),
                format: None,
                name: name.to_string(),
            }) {
                return Some(handler.clone());
            }
        }
        self.by_type
            .get(&TypeKey {
                type_name: type_name.to_string(),
                format: None,
            })
            .map(|entry| entry.clone())
    }

    /// Resolves the element handler for `type_name` and wraps it in a
    /// synthesized delegating handler that splits/joins on `delimiter` using
    /// `escape_char` (see `FieldConfig::is_collection`).
    pub fn resolve_sequence(
        &self,
        type_name: &str,
        format: StreamFormat,
        name: Option<&str>,
        delimiter: char,
        escape_char: char,
    ) -> Option<Arc<dyn TypeHandler>> {
        let element = self.resolve(type_name, format, name)?;
        Some(Arc::new(sequence::SequenceHandler::new(
            element,
            delimiter,
            escape_char,
        )))
    }

    pub fn has_for_type(&self, type_name: &str, format: StreamFormat) -> bool {
        self.resolve(type_name, format, None).is_some()
    }

    pub fn has_named(&self, type_name: &str, format: StreamFormat, name: &str) -> bool {
        self.resolve(type_name, format, Some(name)).is_some()
    }
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for TypeHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHandlerRegistry")
            .field("types", &self.by_type.len())
            .field("named", &self.by_name.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_resolves_builtin_scalars() {
        let registry = TypeHandlerRegistry::with_defaults();
        assert!(registry.has_for_type("string", StreamFormat::Delimited));
        assert!(registry.has_for_type("int", StreamFormat::FixedLength));
        assert!(!registry.has_for_type("widget", StreamFormat::Delimited));
    }

    #[test]
    fn format_specific_registration_takes_priority() {
        let registry = TypeHandlerRegistry::with_defaults();
        registry.register_for_format("int", StreamFormat::Xml, Arc::new(bool_int::BoolAsIntHandler::new(1, 0)));
        let handler = registry.resolve("int", StreamFormat::Xml, None).unwrap();
        assert_eq!(handler.parse("1").unwrap(), Value::Bool(true));
        let fallback = registry.resolve("int", StreamFormat::Delimited, None).unwrap();
        assert_eq!(fallback.parse("1").unwrap(), Value::Int(1));
    }

    #[test]
    fn named_handler_resolves_over_default() {
        let registry = TypeHandlerRegistry::with_defaults();
        registry.register_named("int", "flag", Arc::new(bool_int::BoolAsIntHandler::new(1, 0)));
        assert!(registry.has_named("int", StreamFormat::Delimited, "flag"));
        let handler = registry.resolve("int", StreamFormat::Delimited, Some("flag")).unwrap();
        assert_eq!(handler.parse("0").unwrap(), Value::Bool(false));
    }
}
