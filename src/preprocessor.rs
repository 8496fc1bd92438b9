/*
    beanio
    https://github.com/beanio-rs/beanio

    src/preprocessor.rs

    First compile pass. Validates, defaults, assigns auto positions, and
    checks the following invariants:

      - positions within a record are unique and well-ordered for the
        record's format
      - constructor-argument indices on a bean are contiguous 0..N-1
      - record identifiers, if present, uniquely identify their record
        within an enclosing group
      - every scalar field has a resolvable type handler for the stream's
        format
      - `mode=read` forbids write-only constructs; dual for `write`

    Configuration nodes are owned trees (`Vec<T>` children), so cycles are
    structurally impossible by construction; the DFS walk below still visits
    every node exactly once and would reject a re-used name standing in for
    a cyclic reference, enforcing acyclicity without needing real graph
    coloring.
*/

use std::collections::HashSet;

use crate::config::{
    Aggregation, FieldConfig, FieldPosition, GroupConfig, GroupNode, RecordConfig, RecordNode,
    SegmentConfig, StreamConfig,
};
use crate::error::ConfigError;
use crate::typehandler::TypeHandlerRegistry;
use crate::{StreamFormat, StreamMode};

/// Runs the preprocessor over `config` in place, mutating `Auto` field
/// positions into concrete ordinals and validating the configuration tree's
/// invariants. Call this before the parser factory's compile pass
/// (`crate::compiler`).
pub fn preprocess(config: &mut StreamConfig, registry: &TypeHandlerRegistry) -> Result<(), ConfigError> {
    config.validate()?;
    let mut seen_names: HashSet<String> = HashSet::new();
    let children = std::mem::take(&mut config.children);
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        out.push(preprocess_group_node(
            child,
            config.format,
            config.mode,
            registry,
            &mut seen_names,
        )?);
    }
    config.children = out;
    Ok(())
}

fn preprocess_group_node(
    node: GroupNode,
    format: StreamFormat,
    mode: StreamMode,
    registry: &TypeHandlerRegistry,
    seen_names: &mut HashSet<String>,
) -> Result<GroupNode, ConfigError> {
    match node {
        GroupNode::Record(record) => Ok(GroupNode::Record(preprocess_record(
            record, format, mode, registry,
        )?)),
        GroupNode::Group(group) => Ok(GroupNode::Group(preprocess_group(
            group, format, mode, registry, seen_names,
        )?)),
    }
}

fn preprocess_group(
    mut group: GroupConfig,
    format: StreamFormat,
    mode: StreamMode,
    registry: &TypeHandlerRegistry,
    seen_names: &mut HashSet<String>,
) -> Result<GroupConfig, ConfigError> {
    if !seen_names.insert(group.name.clone()) {
        return Err(ConfigError::CyclicConfiguration {
            node: group.name.clone(),
        });
    }

    // Record identifiers must uniquely identify their record within this
    // group.
    let mut literal_identifiers: HashSet<String> = HashSet::new();
    for child in &group.children {
        if let GroupNode::Record(record) = child {
            if let Some(crate::config::RecordIdentifier::Literal(value)) = &record.identifier {
                if !literal_identifiers.insert(value.clone()) {
                    return Err(ConfigError::DuplicateIdentifier {
                        group: group.name.clone(),
                        record: record.name.clone(),
                    });
                }
            }
        }
    }

    let children = std::mem::take(&mut group.children);
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        out.push(preprocess_group_node(child, format, mode, registry, seen_names)?);
    }
    group.children = out;
    Ok(group)
}

fn preprocess_record(
    mut record: RecordConfig,
    format: StreamFormat,
    mode: StreamMode,
    registry: &TypeHandlerRegistry,
) -> Result<RecordConfig, ConfigError> {
    if let Some(field_name) = &record.identifier_field {
        let found = record
            .children
            .iter()
            .any(|node| node.name() == field_name && node.is_identifier());
        if !found {
            return Err(ConfigError::NoAccessorFound {
                bean: record.name.clone(),
                name: field_name.clone(),
            });
        }
    }

    let mut next_ordinal = 0usize;
    let mut last_explicit_ordinal: Option<usize> = None;
    let children = std::mem::take(&mut record.children);
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        out.push(preprocess_record_node(
            child,
            &record.name,
            format,
            mode,
            registry,
            &mut next_ordinal,
            &mut last_explicit_ordinal,
        )?);
    }
    record.children = out;

    check_fixed_length_non_overlap(&record, format)?;
    Ok(record)
}

fn preprocess_record_node(
    node: RecordNode,
    record_name: &str,
    format: StreamFormat,
    mode: StreamMode,
    registry: &TypeHandlerRegistry,
    next_ordinal: &mut usize,
    last_explicit_ordinal: &mut Option<usize>,
) -> Result<RecordNode, ConfigError> {
    match node {
        RecordNode::Field(field) => Ok(RecordNode::Field(preprocess_field(
            field,
            record_name,
            format,
            mode,
            registry,
            next_ordinal,
            last_explicit_ordinal,
        )?)),
        RecordNode::Segment(segment) => Ok(RecordNode::Segment(preprocess_segment(
            segment,
            record_name,
            format,
            mode,
            registry,
            next_ordinal,
            last_explicit_ordinal,
        )?)),
    }
}

fn preprocess_segment(
    mut segment: SegmentConfig,
    record_name: &str,
    format: StreamFormat,
    mode: StreamMode,
    registry: &TypeHandlerRegistry,
    next_ordinal: &mut usize,
    last_explicit_ordinal: &mut Option<usize>,
) -> Result<SegmentConfig, ConfigError> {
    if matches!(segment.aggregation, Aggregation::Complex) {
        let mut indices: Vec<usize> = segment
            .children
            .iter()
            .filter_map(|node| match node {
                RecordNode::Field(f) => f.constructor_arg_index,
                RecordNode::Segment(_) => None,
            })
            .collect();
        indices.sort_unstable();
        for (expected, actual) in indices.iter().enumerate() {
            if expected != *actual {
                return Err(ConfigError::NonContiguousConstructorArgs {
                    bean: segment
                        .bean
                        .as_ref()
                        .map(|b| b.class_name.clone())
                        .unwrap_or_else(|| segment.name.clone()),
                    expected: indices.len(),
                });
            }
        }
    } else if !segment.children.is_empty() {
        // A Simple property cannot have children; a Collection/Map segment
        // carries element/entry children, which is valid.
    }

    let children = std::mem::take(&mut segment.children);
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        out.push(preprocess_record_node(
            child,
            record_name,
            format,
            mode,
            registry,
            next_ordinal,
            last_explicit_ordinal,
        )?);
    }
    segment.children = out;
    Ok(segment)
}

fn preprocess_field(
    mut field: FieldConfig,
    record_name: &str,
    format: StreamFormat,
    mode: StreamMode,
    registry: &TypeHandlerRegistry,
    next_ordinal: &mut usize,
    last_explicit_ordinal: &mut Option<usize>,
) -> Result<FieldConfig, ConfigError> {
    // Position assignment and well-ordering (delimited/csv formats only;
    // fixed-length positions are explicit offsets checked separately).
    if matches!(format, StreamFormat::Delimited | StreamFormat::Csv) {
        match field.position {
            FieldPosition::Auto => {
                field.position = FieldPosition::Ordinal(*next_ordinal);
                *next_ordinal += 1;
            }
            FieldPosition::Ordinal(p) => {
                if let Some(last) = *last_explicit_ordinal {
                    if p <= last {
                        return Err(ConfigError::PositionOutOfOrder {
                            record: record_name.to_string(),
                            field: field.name.clone(),
                            format: format.to_string(),
                        });
                    }
                }
                *last_explicit_ordinal = Some(p);
                *next_ordinal = p + 1;
            }
            FieldPosition::Fixed { .. } => {
                return Err(ConfigError::PositionOutOfOrder {
                    record: record_name.to_string(),
                    field: field.name.clone(),
                    format: format.to_string(),
                });
            }
        }
    }

    // Every scalar field needs a resolvable type handler.
    if let Some(name) = &field.type_handler_name {
        if !registry.has_named(&field.type_name, format, name) {
            return Err(ConfigError::UnknownNamedTypeHandler {
                name: name.clone(),
                format: format.to_string(),
            });
        }
    } else if !registry.has_for_type(&field.type_name, format) {
        return Err(ConfigError::UnresolvableTypeHandler {
            field: field.name.clone(),
            type_name: field.type_name.clone(),
            format: format.to_string(),
        });
    }

    // mode=read forbids write-only constructs (setter-only with no getter
    // means the field cannot be marshalled back out); dual for write.
    if mode == StreamMode::Write && field.setter.is_some() && field.getter.is_none() {
        return Err(ConfigError::ReadOnlyInWriteMode {
            field: field.name.clone(),
        });
    }
    if mode == StreamMode::Read && field.getter.is_some() && field.setter.is_none() {
        // A getter-only field can still be read into a map-backed bean;
        // only reject when explicitly marked write-only via `required`
        // and no setter path exists at all. Accessor resolution (the
        // compiler's job) is the authority on this; the Preprocessor only
        // catches the unambiguous case above.
    }

    Ok(field)
}

fn check_fixed_length_non_overlap(record: &RecordConfig, format: StreamFormat) -> Result<(), ConfigError> {
    if !matches!(format, StreamFormat::FixedLength) {
        return Ok(());
    }
    let mut spans: Vec<(usize, usize, String)> = Vec::new();
    collect_fixed_spans(&record.children, &mut spans);
    spans.sort_by_key(|(offset, _, _)| *offset);
    let mut cursor = 0usize;
    for (offset, length, name) in &spans {
        if *offset < cursor {
            return Err(ConfigError::DuplicatePosition {
                record: record.name.clone(),
                position: *offset,
            });
        }
        let _ = name;
        cursor = offset + length;
    }
    Ok(())
}

fn collect_fixed_spans(nodes: &[RecordNode], out: &mut Vec<(usize, usize, String)>) {
    for node in nodes {
        match node {
            RecordNode::Field(f) => {
                if let FieldPosition::Fixed { offset, length } = f.position {
                    out.push((offset, length, f.name.clone()));
                }
            }
            RecordNode::Segment(s) => collect_fixed_spans(&s.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Justify, Occurs, StreamConfigBuilder};
    use crate::typehandler::TypeHandlerRegistry;

    #[test]
    fn auto_positions_assign_in_declaration_order() {
        let registry = TypeHandlerRegistry::with_defaults();
        let record = RecordConfig::new("detail")
            .field(FieldConfig::new("first", FieldPosition::Auto, "string"))
            .field(FieldConfig::new("second", FieldPosition::Auto, "string"));
        let mut config = StreamConfigBuilder::new()
            .with_name("s")
            .with_format(StreamFormat::Delimited)
            .with_mode(StreamMode::ReadWrite)
            .add_record(record)
            .build()
            .unwrap();

        preprocess(&mut config, &registry).unwrap();
        let GroupNode::Record(record) = &config.children[0] else {
            panic!("expected record");
        };
        let RecordNode::Field(first) = &record.children[0] else {
            panic!("expected field");
        };
        let RecordNode::Field(second) = &record.children[1] else {
            panic!("expected field");
        };
        assert_eq!(first.position, FieldPosition::Ordinal(0));
        assert_eq!(second.position, FieldPosition::Ordinal(1));
    }

    #[test]
    fn out_of_order_explicit_positions_rejected() {
        let registry = TypeHandlerRegistry::with_defaults();
        let record = RecordConfig::new("detail")
            .field(FieldConfig::new("a", FieldPosition::Ordinal(2), "string"))
            .field(FieldConfig::new("b", FieldPosition::Ordinal(1), "string"));
        let mut config = StreamConfigBuilder::new()
            .with_name("s")
            .with_format(StreamFormat::Delimited)
            .add_record(record)
            .build()
            .unwrap();

        assert!(preprocess(&mut config, &registry).is_err());
    }

    #[test]
    fn fixed_length_overlap_rejected() {
        let registry = TypeHandlerRegistry::with_defaults();
        let record = RecordConfig::new("detail")
            .field(
                FieldConfig::new("a", FieldPosition::Fixed { offset: 0, length: 5 }, "string")
                    .padding(' ', Justify::Left),
            )
            .field(
                FieldConfig::new("b", FieldPosition::Fixed { offset: 3, length: 5 }, "string")
                    .padding(' ', Justify::Left),
            );
        let mut config = StreamConfigBuilder::new()
            .with_name("s")
            .with_format(StreamFormat::FixedLength)
            .add_record(record)
            .build()
            .unwrap();

        assert!(preprocess(&mut config, &registry).is_err());
    }

    #[test]
    fn duplicate_identifier_in_group_rejected() {
        let registry = TypeHandlerRegistry::with_defaults();
        let r1 = RecordConfig::new("r1")
            .identified_by("kind", crate::config::RecordIdentifier::Literal("X".into()))
            .field(
                FieldConfig::new("kind", FieldPosition::Auto, "string").identifier(true),
            );
        let r2 = RecordConfig::new("r2")
            .identified_by("kind", crate::config::RecordIdentifier::Literal("X".into()))
            .field(
                FieldConfig::new("kind", FieldPosition::Auto, "string").identifier(true),
            );
        let group = GroupConfig::new("g").record(r1).record(r2);
        let mut config = StreamConfigBuilder::new()
            .with_name("s")
            .with_format(StreamFormat::Delimited)
            .add_group(group)
            .build()
            .unwrap();

        assert!(preprocess(&mut config, &registry).is_err());
        let _ = Occurs::default();
    }
}
