/*
    beanio
    https://github.com/beanio-rs/beanio

    src/compiler/mod.rs

    The second compile pass: lowers an already-preprocessed `StreamConfig`
    into a `parser::StreamParser` / `property::PropertyComponent` pair.
    `CompileContext` encapsulates the two stacks a recursive-descent pass
    threads through compilation — `parser_stack` and `property_stack` — as
    one object, with `StackEntry::Unbound` as its own enum variant standing
    in for "this parser scope binds no property" rather than a shared
    null-object singleton. The stacks exist to report a dotted compile-time
    path in errors and to let a nested segment look up its nearest enclosing
    bean binding; the actual tree is still built by ordinary recursive
    descent; push/pop brackets each recursive call.

    Constructor selection happens here, not in the unmarshal/marshal
    drivers: on popping a bean-bound Complex/Collection/Map property,
    `build_bean_binding` counts its constructor-argument children (already
    enforced contiguous by `crate::preprocessor`) and asks
    `crate::beanfactory::BeanFactoryRegistry::select` to score every
    candidate as if that shape were already populated. The winning choice
    is stored on `BeanBinding` and reused by every record instance the
    drivers unmarshal/marshal, so a bean with no matching constructor
    fails `compile()` once rather than every `Reader::read()`.
*/

use regex::Regex;

use crate::beanfactory::BeanFactoryRegistry;
use crate::config::{
    Aggregation, BeanSpec, FieldConfig, FieldPosition, GroupConfig, GroupNode, RecordConfig, RecordNode,
    SegmentConfig, StreamConfig,
};
use crate::error::ConfigError;
use crate::parser::{
    CompiledIdentifier, FieldParser, GroupChild, ParserComponent, RecordGroupParser, RecordParser,
    SegmentParser, StreamParser,
};
use crate::property::{BeanBinding, ComplexProperty, CollectionProperty, MapProperty, PropertyBase, PropertyComponent, SimpleProperty};
use crate::typehandler::TypeHandlerRegistry;
use crate::StreamFormat;

/// A stack frame: either a named node (record/segment/field) or the
/// "currently compiling something with no enclosing bean" sentinel.
#[derive(Debug, Clone)]
pub enum StackEntry {
    Unbound,
    Named(String),
}

/// Encapsulates the compiler's two parallel stacks.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    parser_stack: Vec<StackEntry>,
    property_stack: Vec<StackEntry>,
}

impl CompileContext {
    pub fn new() -> Self {
        CompileContext {
            parser_stack: Vec::new(),
            property_stack: Vec::new(),
        }
    }

    fn push(&mut self, name: &str) {
        self.parser_stack.push(StackEntry::Named(name.to_string()));
        self.property_stack.push(StackEntry::Named(name.to_string()));
    }

    fn push_unbound(&mut self) {
        self.parser_stack.push(StackEntry::Unbound);
        self.property_stack.push(StackEntry::Unbound);
    }

    fn pop(&mut self) {
        self.parser_stack.pop();
        self.property_stack.pop();
    }

    /// The dotted path of named frames currently on the stack, used to
    /// qualify compile errors (e.g. `stream.record.segment.field`).
    pub fn path(&self) -> String {
        self.parser_stack
            .iter()
            .filter_map(|entry| match entry {
                StackEntry::Named(name) => Some(name.as_str()),
                StackEntry::Unbound => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Lowers a preprocessed `StreamConfig` into its runtime `StreamParser`.
/// Callers should have already run `crate::preprocessor::preprocess` over
/// `config` so that `FieldPosition::Auto` never appears here.
///
/// `bean_factory` is consulted here, not deferred to the unmarshal driver:
/// every bean-bound `Complex` property has its constructor selected now
/// (`build_bean_binding`), so a bean with no matching constructor fails
/// compilation once instead of failing every subsequent `Reader::read()`.
pub fn compile(
    config: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
) -> Result<StreamParser, ConfigError> {
    let mut ctx = CompileContext::new();
    ctx.push(&config.name);
    let root = compile_children(&config.children, config, type_handlers, bean_factory, &mut ctx)?;
    ctx.pop();
    Ok(StreamParser {
        name: config.name.clone(),
        root: RecordGroupParser {
            name: config.name.clone(),
            occurs: crate::config::Occurs::default(),
            ordering: config.ordering,
            allow_unidentified: config.allow_unidentified,
            children: root,
        },
    })
}

/// Extracts the already-compiled `PropertyComponent` a `ParserComponent`
/// binds to, without recompiling it.
fn property_of(node: &ParserComponent) -> PropertyComponent {
    match node {
        ParserComponent::Field(f) => PropertyComponent::Simple(f.property.clone()),
        ParserComponent::Segment(s) => s.property.clone(),
        _ => unreachable!("record nodes only compile to Field or Segment"),
    }
}

/// Selects (or refuses) the constructor a bean-bound property will use for
/// every record instance, per spec.md §4.5's "on popping a Complex
/// property, `UpdateConstructor` is invoked". `children` are this
/// property's already-compiled members, used only to count how many are
/// constructor-argument bound — the preprocessor has already enforced that
/// those indices are contiguous `0..arity-1`.
fn build_bean_binding(
    bean: Option<&BeanSpec>,
    children: &[PropertyComponent],
    bean_factory: &BeanFactoryRegistry,
) -> Result<Option<BeanBinding>, ConfigError> {
    let Some(bean) = bean else {
        return Ok(None);
    };
    let arity = children.iter().filter(|c| c.constructor_arg_index().is_some()).count();
    let constructor = bean_factory.select(&bean.class_name, arity)?;
    Ok(Some(BeanBinding {
        class_name: bean.class_name.clone(),
        constructor,
    }))
}

fn compile_children(
    children: &[GroupNode],
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
    ctx: &mut CompileContext,
) -> Result<Vec<GroupChild>, ConfigError> {
    children
        .iter()
        .map(|child| compile_group_node(child, stream, type_handlers, bean_factory, ctx))
        .collect()
}

fn compile_group_node(
    node: &GroupNode,
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
    ctx: &mut CompileContext,
) -> Result<GroupChild, ConfigError> {
    match node {
        GroupNode::Record(record) => Ok(GroupChild::Record(compile_record(record, stream, type_handlers, bean_factory, ctx)?)),
        GroupNode::Group(group) => Ok(GroupChild::Group(compile_group(group, stream, type_handlers, bean_factory, ctx)?)),
    }
}

fn compile_group(
    group: &GroupConfig,
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
    ctx: &mut CompileContext,
) -> Result<RecordGroupParser, ConfigError> {
    ctx.push(&group.name);
    let children = compile_children(&group.children, stream, type_handlers, bean_factory, ctx)?;
    ctx.pop();
    Ok(RecordGroupParser {
        name: group.name.clone(),
        occurs: group.occurs,
        ordering: group.ordering,
        allow_unidentified: group.allow_unidentified,
        children,
    })
}

fn compile_record(
    record: &RecordConfig,
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
    ctx: &mut CompileContext,
) -> Result<RecordParser, ConfigError> {
    ctx.push(&record.name);
    let children = record
        .children
        .iter()
        .map(|child| compile_record_node(child, stream, type_handlers, bean_factory, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let child_properties: Vec<PropertyComponent> = children.iter().map(property_of).collect();
    let is_identifier = child_properties.iter().any(PropertyComponent::propagates_identifier);
    let bean = build_bean_binding(record.bean.as_ref(), &child_properties, bean_factory)?;

    let property = PropertyComponent::Complex(ComplexProperty {
        base: PropertyBase {
            name: record.name.clone(),
            is_identifier,
            constructor_arg_index: None,
        },
        bean,
        children: child_properties,
    });

    let identifier = match (&record.identifier_field, &record.identifier) {
        (Some(field), Some(id)) => Some(CompiledIdentifier::new(field.clone(), id.clone())),
        _ => None,
    };

    ctx.pop();
    Ok(RecordParser {
        name: record.name.clone(),
        occurs: record.occurs,
        identifier,
        root: SegmentParser {
            occurs: crate::config::Occurs::exactly(1),
            property,
            children,
        },
    })
}

fn compile_record_node(
    node: &RecordNode,
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
    ctx: &mut CompileContext,
) -> Result<ParserComponent, ConfigError> {
    match node {
        RecordNode::Field(field) => Ok(ParserComponent::Field(compile_field(field, stream, type_handlers, ctx)?)),
        RecordNode::Segment(segment) => {
            Ok(ParserComponent::Segment(compile_segment(segment, stream, type_handlers, bean_factory, ctx)?))
        }
    }
}

fn compile_field(
    field: &FieldConfig,
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    ctx: &mut CompileContext,
) -> Result<FieldParser, ConfigError> {
    ctx.push(&field.name);

    let handler = if field.is_collection {
        type_handlers.resolve_sequence(
            &field.type_name,
            stream.format,
            field.type_handler_name.as_deref(),
            stream.field_delimiter,
            stream.escape_char,
        )
    } else {
        type_handlers.resolve(&field.type_name, stream.format, field.type_handler_name.as_deref())
    }
    .ok_or_else(|| ConfigError::UnresolvableTypeHandler {
        field: ctx.path(),
        type_name: field.type_name.clone(),
        format: stream.format.to_string(),
    })?;

    let pattern = field
        .pattern
        .as_ref()
        .map(|p| Regex::new(p))
        .transpose()
        .map_err(|_| ConfigError::UnresolvableTypeHandler {
            field: ctx.path(),
            type_name: field.type_name.clone(),
            format: stream.format.to_string(),
        })?;

    ctx.pop();
    Ok(FieldParser {
        position: field.position,
        required: field.required,
        min_length: field.min_length,
        max_length: field.max_length,
        pattern,
        default_value: field.default_value.clone(),
        pad_character: field.pad_character,
        justify: field.justify,
        property: SimpleProperty {
            base: PropertyBase {
                name: field.name.clone(),
                is_identifier: field.is_identifier,
                constructor_arg_index: field.constructor_arg_index,
            },
            handler,
        },
    })
}

fn compile_segment(
    segment: &SegmentConfig,
    stream: &StreamConfig,
    type_handlers: &TypeHandlerRegistry,
    bean_factory: &BeanFactoryRegistry,
    ctx: &mut CompileContext,
) -> Result<SegmentParser, ConfigError> {
    if segment.bean.is_some() {
        ctx.push(&segment.name);
    } else {
        ctx.push_unbound();
    }

    let children = segment
        .children
        .iter()
        .map(|child| compile_record_node(child, stream, type_handlers, bean_factory, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let child_properties: Vec<PropertyComponent> = children.iter().map(property_of).collect();
    let is_identifier = child_properties.iter().any(PropertyComponent::propagates_identifier);

    let base = PropertyBase {
        name: segment.name.clone(),
        is_identifier,
        constructor_arg_index: None,
    };

    let property = match segment.aggregation {
        Aggregation::Complex => {
            let bean = build_bean_binding(segment.bean.as_ref(), &child_properties, bean_factory)?;
            PropertyComponent::Complex(ComplexProperty {
                base,
                bean,
                children: child_properties,
            })
        }
        Aggregation::Collection => {
            if segment.children.is_empty() {
                return Err(ConfigError::SimplePropertyHasChildren {
                    name: ctx.path(),
                });
            }
            let element = if child_properties.len() == 1 {
                child_properties.into_iter().next().unwrap()
            } else {
                let bean = build_bean_binding(segment.bean.as_ref(), &child_properties, bean_factory)?;
                PropertyComponent::Complex(ComplexProperty {
                    base: PropertyBase {
                        name: format!("{}.element", segment.name),
                        is_identifier,
                        constructor_arg_index: None,
                    },
                    bean,
                    children: child_properties,
                })
            };
            PropertyComponent::Collection(CollectionProperty {
                base,
                element: Box::new(element),
            })
        }
        Aggregation::Map => {
            if segment.children.len() < 2 {
                return Err(ConfigError::SimplePropertyHasChildren {
                    name: ctx.path(),
                });
            }
            let (key_index, value_index) = crate::layout::map_key_value_indices(&children);
            let key_handler = match &children[key_index] {
                ParserComponent::Field(f) => f.property.handler.clone(),
                _ => return Err(ConfigError::SimplePropertyHasChildren { name: ctx.path() }),
            };
            let value_property = child_properties[value_index].clone();
            PropertyComponent::Map(MapProperty {
                base,
                key_handler,
                value: Box::new(value_property),
            })
        }
    };

    ctx.pop();
    Ok(SegmentParser {
        occurs: segment.occurs,
        property,
        children,
    })
}

/// Resolved position safety net: `preprocess` must run before `compile`.
/// Kept as an explicit check, not an assertion, so a caller skipping the
/// Preprocessor gets a configuration error rather than a silent
/// misposition.
pub fn ensure_positions_resolved(config: &StreamConfig) -> Result<(), ConfigError> {
    fn check_nodes(nodes: &[RecordNode], record: &str) -> Result<(), ConfigError> {
        for node in nodes {
            match node {
                RecordNode::Field(f) => {
                    if matches!(f.position, FieldPosition::Auto) {
                        return Err(ConfigError::PositionOutOfOrder {
                            record: record.to_string(),
                            field: f.name.clone(),
                            format: "unresolved".to_string(),
                        });
                    }
                }
                RecordNode::Segment(s) => check_nodes(&s.children, record)?,
            }
        }
        Ok(())
    }

    fn check_group(children: &[GroupNode]) -> Result<(), ConfigError> {
        for child in children {
            match child {
                GroupNode::Record(r) => check_nodes(&r.children, &r.name)?,
                GroupNode::Group(g) => check_group(&g.children)?,
            }
        }
        Ok(())
    }

    check_group(&config.children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfigBuilder;
    use crate::preprocessor::preprocess;

    #[test]
    fn compiles_a_flat_delimited_record() {
        let registry = TypeHandlerRegistry::with_defaults();
        let record = RecordConfig::new("detail")
            .field(FieldConfig::new("name", FieldPosition::Auto, "string"))
            .field(FieldConfig::new("age", FieldPosition::Auto, "int"));
        let mut config = StreamConfigBuilder::new()
            .with_name("s")
            .with_format(StreamFormat::Delimited)
            .add_record(record)
            .build()
            .unwrap();

        preprocess(&mut config, &registry).unwrap();
        let bean_factory = BeanFactoryRegistry::new();
        let compiled = compile(&config, &registry, &bean_factory).unwrap();
        assert_eq!(compiled.root.children.len(), 1);
        let GroupChild::Record(record) = &compiled.root.children[0] else {
            panic!("expected record");
        };
        assert_eq!(record.root.children.len(), 2);
    }
}
