/*
    beanio
    https://github.com/beanio-rs/beanio

    src/property/mod.rs

    The compiled property tree: what a record's fields bind to in memory,
    as opposed to `crate::parser`'s `ParserComponent` tree, which describes
    how text maps to records. The parser factory (`crate::compiler`) builds
    one property tree per record from its `RecordConfig`/`SegmentConfig`
    children; `Reader`/`Writer` walk it against a `Value` during
    unmarshal/marshal.

    Shape is an enum-of-variants-with-a-shared-base-field: per-aggregation
    property variants sharing name/identifier/constructor-arg metadata in
    `PropertyBase`.
*/

use std::sync::Arc;

use crate::beanfactory::ConstructorChoice;
use crate::config::Aggregation;
use crate::typehandler::TypeHandler;

/// Fields shared by every property variant.
#[derive(Clone)]
pub struct PropertyBase {
    pub name: String,
    /// True if this property's value identifies which record/segment
    /// definition applies.
    pub is_identifier: bool,
    /// Set if this property binds a constructor argument rather than (or
    /// in addition to) a setter.
    pub constructor_arg_index: Option<usize>,
}

/// A scalar leaf, converted to/from text by `handler`.
#[derive(Clone)]
pub struct SimpleProperty {
    pub base: PropertyBase,
    pub handler: Arc<dyn TypeHandler>,
}

/// Which bean type backs a `Complex` property, if any. Absent, a property
/// falls back to the generic schema-to-map default.
#[derive(Debug, Clone)]
pub struct BeanBinding {
    pub class_name: String,
    /// The constructor chosen for this bean at compile time; see
    /// `crate::beanfactory::BeanFactoryRegistry::select`.
    pub constructor: ConstructorChoice,
}

/// Named members aggregated into one bean (or, with no `bean`, a
/// `Value::Map`).
#[derive(Clone)]
pub struct ComplexProperty {
    pub base: PropertyBase,
    pub bean: Option<BeanBinding>,
    pub children: Vec<PropertyComponent>,
}

/// An ordered sequence of repeated `element` properties.
#[derive(Clone)]
pub struct CollectionProperty {
    pub base: PropertyBase,
    pub element: Box<PropertyComponent>,
}

/// A keyed mapping from a scalar key (converted by `key_handler`) to
/// repeated `value` properties.
#[derive(Clone)]
pub struct MapProperty {
    pub base: PropertyBase,
    pub key_handler: Arc<dyn TypeHandler>,
    pub value: Box<PropertyComponent>,
}

/// The four property shapes, mirroring `crate::config::Aggregation` but
/// carrying runtime bindings instead of configuration.
#[derive(Clone)]
pub enum PropertyComponent {
    Simple(SimpleProperty),
    Complex(ComplexProperty),
    Collection(CollectionProperty),
    Map(MapProperty),
}

impl PropertyComponent {
    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn is_identifier(&self) -> bool {
        self.base().is_identifier
    }

    pub fn constructor_arg_index(&self) -> Option<usize> {
        self.base().constructor_arg_index
    }

    pub fn base(&self) -> &PropertyBase {
        match self {
            PropertyComponent::Simple(p) => &p.base,
            PropertyComponent::Complex(p) => &p.base,
            PropertyComponent::Collection(p) => &p.base,
            PropertyComponent::Map(p) => &p.base,
        }
    }

    pub fn aggregation(&self) -> Aggregation {
        match self {
            PropertyComponent::Simple(_) => Aggregation::Complex,
            PropertyComponent::Complex(_) => Aggregation::Complex,
            PropertyComponent::Collection(_) => Aggregation::Collection,
            PropertyComponent::Map(_) => Aggregation::Map,
        }
    }

    /// True if any property in this subtree is an identifier — used to
    /// propagate "this segment participates in record identification"
    /// upward through enclosing segments.
    pub fn propagates_identifier(&self) -> bool {
        match self {
            PropertyComponent::Simple(p) => p.base.is_identifier,
            PropertyComponent::Complex(p) => {
                p.base.is_identifier || p.children.iter().any(PropertyComponent::propagates_identifier)
            }
            PropertyComponent::Collection(p) => p.base.is_identifier || p.element.propagates_identifier(),
            PropertyComponent::Map(p) => p.base.is_identifier || p.value.propagates_identifier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typehandler::builtin::StringHandler;

    fn simple(name: &str, is_identifier: bool) -> PropertyComponent {
        PropertyComponent::Simple(SimpleProperty {
            base: PropertyBase {
                name: name.to_string(),
                is_identifier,
                constructor_arg_index: None,
            },
            handler: Arc::new(StringHandler),
        })
    }

    #[test]
    fn identifier_propagates_through_complex_children() {
        let complex = PropertyComponent::Complex(ComplexProperty {
            base: PropertyBase {
                name: "root".to_string(),
                is_identifier: false,
                constructor_arg_index: None,
            },
            bean: None,
            children: vec![simple("kind", true), simple("value", false)],
        });
        assert!(complex.propagates_identifier());
    }

    #[test]
    fn aggregation_matches_variant() {
        assert_eq!(simple("x", false).aggregation(), Aggregation::Complex);
    }

    #[test]
    fn identifier_propagates_through_collection_element() {
        let collection = PropertyComponent::Collection(CollectionProperty {
            base: PropertyBase {
                name: "codes".to_string(),
                is_identifier: false,
                constructor_arg_index: None,
            },
            element: Box::new(simple("code", true)),
        });
        assert!(collection.propagates_identifier());
    }

    #[test]
    fn identifier_propagates_through_map_value() {
        let map = PropertyComponent::Map(MapProperty {
            base: PropertyBase {
                name: "entries".to_string(),
                is_identifier: false,
                constructor_arg_index: None,
            },
            key_handler: Arc::new(StringHandler),
            value: Box::new(simple("value", true)),
        });
        assert!(map.propagates_identifier());
    }
}
