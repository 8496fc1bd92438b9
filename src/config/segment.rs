/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/segment.rs

    A named bundle of fields/segments bound to a member of the enclosing
    bean, or an element of a collection/map.
*/

use crate::config::bean::BeanSpec;
use crate::config::field::FieldConfig;
use crate::config::occurs::Occurs;

/// A child of a [`crate::config::RecordConfig`] or another `SegmentConfig`:
/// either a scalar field or a nested segment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordNode {
    Field(FieldConfig),
    Segment(SegmentConfig),
}

impl RecordNode {
    pub fn name(&self) -> &str {
        match self {
            RecordNode::Field(f) => &f.name,
            RecordNode::Segment(s) => &s.name,
        }
    }

    pub fn is_identifier(&self) -> bool {
        match self {
            RecordNode::Field(f) => f.is_identifier,
            RecordNode::Segment(s) => s.children.iter().any(RecordNode::is_identifier),
        }
    }
}

/// Whether a segment's children aggregate as named members (`Complex`), an
/// ordered sequence (`Collection`), or a keyed mapping (`Map`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aggregation {
    #[default]
    Complex,
    Collection,
    Map,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentConfig {
    pub name: String,
    pub aggregation: Aggregation,
    /// Set when `aggregation` is `Complex` and this segment binds to a
    /// registered bean type rather than a generic `Value::Map`.
    pub bean: Option<BeanSpec>,
    /// Occurrences of this segment itself within its parent (for repeating
    /// segments bound to collection/map elements).
    pub occurs: Occurs,
    pub children: Vec<RecordNode>,
}

impl SegmentConfig {
    pub fn new(name: impl Into<String>, aggregation: Aggregation) -> Self {
        SegmentConfig {
            name: name.into(),
            aggregation,
            bean: None,
            occurs: Occurs::exactly(1),
            children: Vec::new(),
        }
    }

    pub fn bean(mut self, bean: BeanSpec) -> Self {
        self.bean = Some(bean);
        self
    }

    pub fn occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    pub fn field(mut self, field: FieldConfig) -> Self {
        self.children.push(RecordNode::Field(field));
        self
    }

    pub fn segment(mut self, segment: SegmentConfig) -> Self {
        self.children.push(RecordNode::Segment(segment));
        self
    }
}
