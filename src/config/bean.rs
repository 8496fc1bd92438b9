/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/bean.rs

    Configuration-time description of an aggregate target. `class_name` is
    not a reflected CLR/JVM type name here — it is the key the accessor
    registry (`crate::accessor`) and bean factory (`crate::beanfactory`) use
    to look up registered constructors/accessors for this bean. A `BeanSpec`
    with no registered counterpart falls back to the generic `Value::Map`
    mode.
*/

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeanSpec {
    pub class_name: String,
    /// Explicit getter/setter name overrides, keyed by logical property
    /// name, consulted first in accessor resolution.
    pub getter_overrides: BTreeMap<String, String>,
    pub setter_overrides: BTreeMap<String, String>,
}

impl BeanSpec {
    pub fn new(class_name: impl Into<String>) -> Self {
        BeanSpec {
            class_name: class_name.into(),
            getter_overrides: BTreeMap::new(),
            setter_overrides: BTreeMap::new(),
        }
    }

    pub fn with_getter(mut self, property: impl Into<String>, getter: impl Into<String>) -> Self {
        self.getter_overrides.insert(property.into(), getter.into());
        self
    }

    pub fn with_setter(mut self, property: impl Into<String>, setter: impl Into<String>) -> Self {
        self.setter_overrides.insert(property.into(), setter.into());
        self
    }
}
