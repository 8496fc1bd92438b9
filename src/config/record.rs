/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/record.rs

    `RecordConfig` describes one logical record type within a stream;
    `GroupConfig` groups records (and nested groups) under an ordering
    discipline. Both carry min/max occurrences enforced by the unmarshal
    driver at group boundaries.
*/

use crate::config::bean::BeanSpec;
use crate::config::identifier::RecordIdentifier;
use crate::config::occurs::{Occurs, Ordering};
use crate::config::segment::RecordNode;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordConfig {
    pub name: String,
    pub occurs: Occurs,
    pub identifier_field: Option<String>,
    pub identifier: Option<RecordIdentifier>,
    /// The bean type this record's top-level `Complex` segment binds to, if
    /// any. `None` defaults to the generic `Value::Map` mode.
    pub bean: Option<BeanSpec>,
    pub children: Vec<RecordNode>,
}

impl RecordConfig {
    pub fn new(name: impl Into<String>) -> Self {
        RecordConfig {
            name: name.into(),
            occurs: Occurs::default(),
            identifier_field: None,
            identifier: None,
            bean: None,
            children: Vec::new(),
        }
    }

    pub fn occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    pub fn bean(mut self, bean: BeanSpec) -> Self {
        self.bean = Some(bean);
        self
    }

    pub fn identified_by(mut self, field: impl Into<String>, identifier: RecordIdentifier) -> Self {
        self.identifier_field = Some(field.into());
        self.identifier = Some(identifier);
        self
    }

    pub fn field(mut self, field: crate::config::field::FieldConfig) -> Self {
        self.children.push(RecordNode::Field(field));
        self
    }

    pub fn segment(mut self, segment: crate::config::segment::SegmentConfig) -> Self {
        self.children.push(RecordNode::Segment(segment));
        self
    }
}

/// A child of a [`GroupConfig`]: either a leaf record or a nested group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupNode {
    Record(RecordConfig),
    Group(GroupConfig),
}

impl GroupNode {
    pub fn name(&self) -> &str {
        match self {
            GroupNode::Record(r) => &r.name,
            GroupNode::Group(g) => &g.name,
        }
    }

    pub fn occurs(&self) -> Occurs {
        match self {
            GroupNode::Record(r) => r.occurs,
            GroupNode::Group(g) => g.occurs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupConfig {
    pub name: String,
    pub occurs: Occurs,
    pub ordering: Ordering,
    /// If true, a record that matches no declared identifier is skipped
    /// rather than raising an `unidentifiable` error.
    pub allow_unidentified: bool,
    pub children: Vec<GroupNode>,
}

impl GroupConfig {
    pub fn new(name: impl Into<String>) -> Self {
        GroupConfig {
            name: name.into(),
            occurs: Occurs::default(),
            ordering: Ordering::default(),
            allow_unidentified: false,
            children: Vec::new(),
        }
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    pub fn allow_unidentified(mut self, allow: bool) -> Self {
        self.allow_unidentified = allow;
        self
    }

    pub fn record(mut self, record: RecordConfig) -> Self {
        self.children.push(GroupNode::Record(record));
        self
    }

    pub fn group(mut self, group: GroupConfig) -> Self {
        self.children.push(GroupNode::Group(group));
        self
    }
}
