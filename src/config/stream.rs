/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/stream.rs

    `StreamConfig` is the root of the declarative configuration tree.
    `StreamConfigBuilder` follows a consuming-self builder pattern: each
    `with_*` method takes and returns `self`, and `build()` validates
    required fields before handing off to the preprocessor.
*/

use crate::config::occurs::Ordering;
use crate::config::record::GroupNode;
use crate::error::ConfigError;
use crate::{StreamFormat, StreamMode, DEFAULT_ESCAPE_CHAR};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamConfig {
    pub name: String,
    pub format: StreamFormat,
    pub mode: StreamMode,
    pub ordering: Ordering,
    pub children: Vec<GroupNode>,
    /// Whether `\0` decodes to NUL in escaping handlers.
    pub null_escaping_enabled: bool,
    /// Single-character escape for escaping handlers and synthesized
    /// sequence handlers.
    pub escape_char: char,
    /// Delimiter synthesized sequence handlers split/join on.
    pub field_delimiter: char,
    /// Locale tag consulted by numeric/date formatting type handlers.
    pub culture: String,
    /// Gates whether the accessor registry accepts accessors registered
    /// with restricted visibility.
    pub allow_protected_property_access: bool,
    /// Whether a record at the top level of the stream that matches no
    /// declared identifier is skipped rather than raising
    /// `RecordError::UnidentifiedRecord`. Nested `GroupConfig`s carry their
    /// own independent `allow_unidentified` flag; this one governs only the
    /// stream's implicit top-level group.
    pub allow_unidentified: bool,
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingRequiredConfig {
                field: "name".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    name: Option<String>,
    format: Option<StreamFormat>,
    mode: StreamMode,
    ordering: Ordering,
    children: Vec<GroupNode>,
    null_escaping_enabled: bool,
    escape_char: Option<char>,
    field_delimiter: Option<char>,
    culture: Option<String>,
    allow_protected_property_access: bool,
    allow_unidentified: bool,
}

impl StreamConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_format(mut self, format: StreamFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_mode(mut self, mode: StreamMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_null_escaping(mut self, enabled: bool) -> Self {
        self.null_escaping_enabled = enabled;
        self
    }

    pub fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = Some(escape_char);
        self
    }

    pub fn with_field_delimiter(mut self, delimiter: char) -> Self {
        self.field_delimiter = Some(delimiter);
        self
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn with_protected_access(mut self, allow: bool) -> Self {
        self.allow_protected_property_access = allow;
        self
    }

    pub fn with_allow_unidentified(mut self, allow: bool) -> Self {
        self.allow_unidentified = allow;
        self
    }

    pub fn add_record(mut self, record: crate::config::record::RecordConfig) -> Self {
        self.children.push(GroupNode::Record(record));
        self
    }

    pub fn add_group(mut self, group: crate::config::record::GroupConfig) -> Self {
        self.children.push(GroupNode::Group(group));
        self
    }

    pub fn build(self) -> Result<StreamConfig, ConfigError> {
        let name = self.name.ok_or_else(|| ConfigError::MissingRequiredConfig {
            field: "name".to_string(),
        })?;
        let format = self.format.ok_or_else(|| ConfigError::MissingRequiredConfig {
            field: "format".to_string(),
        })?;
        let config = StreamConfig {
            name,
            format,
            mode: self.mode,
            ordering: self.ordering,
            children: self.children,
            null_escaping_enabled: self.null_escaping_enabled,
            escape_char: self.escape_char.unwrap_or(DEFAULT_ESCAPE_CHAR),
            field_delimiter: self.field_delimiter.unwrap_or(','),
            culture: self.culture.unwrap_or_else(|| "en-US".to_string()),
            allow_protected_property_access: self.allow_protected_property_access,
            allow_unidentified: self.allow_unidentified,
        };
        config.validate()?;
        Ok(config)
    }
}
