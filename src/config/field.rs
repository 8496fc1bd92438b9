/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/field.rs

    Declarative configuration for one scalar field position within a record.
    `FieldConfig` is pure data — the preprocessor (first compile pass)
    validates and defaults it, the parser factory (second compile pass)
    lowers it into a `parser::Field` + `property::Simple` pair.
*/

use crate::config::occurs::Justify;

/// Where a field sits within its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldPosition {
    /// Position left for the Preprocessor to assign: the next free ordinal
    /// in declaration order (delimited formats only).
    Auto,
    /// Ordinal position for delimited/CSV formats, 0-based.
    Ordinal(usize),
    /// Byte offset + width for fixed-length formats.
    Fixed { offset: usize, length: usize },
}

impl FieldPosition {
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            FieldPosition::Ordinal(p) => Some(*p),
            FieldPosition::Auto | FieldPosition::Fixed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldConfig {
    pub name: String,
    pub position: FieldPosition,
    pub required: bool,
    pub default_value: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    /// Target scalar type name (e.g. "string", "int", "long", "bool",
    /// "double"). Resolved against the `TypeHandlerRegistry` together with
    /// `type_handler_name` by the registry's most-specific-first order.
    pub type_name: String,
    pub type_handler_name: Option<String>,
    /// 0-based index if this field binds a bean constructor argument instead
    /// of (or in addition to) a setter.
    pub constructor_arg_index: Option<usize>,
    /// Explicit getter/setter names, consulted first in the accessor
    /// resolution order.
    pub getter: Option<String>,
    pub setter: Option<String>,
    /// True if this field's value identifies which record definition
    /// applies to an incoming record.
    pub is_identifier: bool,
    /// Fixed-length padding character and justification.
    pub pad_character: char,
    pub justify: Justify,
    /// If true, this field's type is a sequence-of-`type_name` and the
    /// registry synthesizes a delegating handler.
    pub is_collection: bool,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, position: FieldPosition, type_name: impl Into<String>) -> Self {
        FieldConfig {
            name: name.into(),
            position,
            required: false,
            default_value: None,
            min_length: None,
            max_length: None,
            pattern: None,
            type_name: type_name.into(),
            type_handler_name: None,
            constructor_arg_index: None,
            getter: None,
            setter: None,
            is_identifier: false,
            pad_character: ' ',
            justify: Justify::Left,
            is_collection: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn length_bounds(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn type_handler_name(mut self, name: impl Into<String>) -> Self {
        self.type_handler_name = Some(name.into());
        self
    }

    pub fn constructor_arg(mut self, index: usize) -> Self {
        self.constructor_arg_index = Some(index);
        self
    }

    pub fn accessors(mut self, getter: Option<&str>, setter: Option<&str>) -> Self {
        self.getter = getter.map(str::to_string);
        self.setter = setter.map(str::to_string);
        self
    }

    pub fn identifier(mut self, is_identifier: bool) -> Self {
        self.is_identifier = is_identifier;
        self
    }

    pub fn padding(mut self, pad_character: char, justify: Justify) -> Self {
        self.pad_character = pad_character;
        self.justify = justify;
        self
    }

    pub fn collection(mut self, is_collection: bool) -> Self {
        self.is_collection = is_collection;
        self
    }

    pub fn width(&self) -> Option<usize> {
        match self.position {
            FieldPosition::Fixed { length, .. } => Some(length),
            FieldPosition::Ordinal(_) | FieldPosition::Auto => None,
        }
    }
}
