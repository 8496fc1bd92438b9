/*
    beanio
    https://github.com/beanio-rs/beanio

    src/layout.rs

    Position arithmetic shared by the unmarshal driver (`crate::reader`) and
    the marshal driver (`crate::writer`): both walk the same parser tree and
    need to know how many ordinal slots or fixed-length bytes one repetition
    of a Collection/Map element consumes, so a repeated element's Nth
    occurrence can be read from (or written to) the positions `stride * N`
    past the element template's declared position.
*/

use crate::config::FieldPosition;
use crate::parser::{FieldParser, ParserComponent};
use crate::StreamFormat;

/// How many ordinal slots (delimited/CSV) or bytes (fixed-length) one field
/// occupies.
pub fn field_width(format: StreamFormat, position: &FieldPosition) -> i64 {
    match (format, position) {
        (StreamFormat::FixedLength, FieldPosition::Fixed { length, .. }) => *length as i64,
        _ => 1,
    }
}

/// Total width of one repetition unit: a single field, or every leaf field
/// of a nested segment summed together.
pub fn node_width(node: &ParserComponent, format: StreamFormat) -> i64 {
    match node {
        ParserComponent::Field(f) => field_width(format, &f.position),
        ParserComponent::Segment(s) => s.children.iter().map(|c| node_width(c, format)).sum(),
        _ => 0,
    }
}

/// Applies a repetition offset to a field's declared position. `shift` is
/// `repetition_index * stride`, computed by the caller from [`node_width`].
pub fn shift_position(position: FieldPosition, shift: i64) -> FieldPosition {
    match position {
        FieldPosition::Ordinal(p) => FieldPosition::Ordinal((p as i64 + shift).max(0) as usize),
        FieldPosition::Fixed { offset, length } => FieldPosition::Fixed {
            offset: (offset as i64 + shift).max(0) as usize,
            length,
        },
        FieldPosition::Auto => FieldPosition::Auto,
    }
}

/// The bound property name of a record/segment child, used as both the
/// `Value::Map`/`Value::Object` key and the constructor-argument lookup key.
pub fn node_name(node: &ParserComponent) -> String {
    match node {
        ParserComponent::Field(f) => f.property.base.name.clone(),
        ParserComponent::Segment(s) => s.property.name().to_string(),
        _ => String::new(),
    }
}

pub fn node_ctor_index(node: &ParserComponent) -> Option<usize> {
    match node {
        ParserComponent::Field(f) => f.property.base.constructor_arg_index,
        ParserComponent::Segment(s) => s.property.constructor_arg_index(),
        _ => None,
    }
}

/// Convention for Map-aggregated segments: a key child named `key`
/// (falling back to the first child) and a value child named `value`
/// (falling back to the second), mirroring
/// `crate::compiler::map_key_value_children`.
pub fn map_key_value_indices(children: &[ParserComponent]) -> (usize, usize) {
    let key = children.iter().position(|c| node_name(c) == "key").unwrap_or(0);
    let value = children
        .iter()
        .position(|c| node_name(c) == "value")
        .unwrap_or(children.len().min(2) - 1);
    (key, value)
}

/// The first scalar field reached by descending into a node's leftmost
/// children, used to probe whether a repeated Collection/Map element is
/// present at all in the current record.
pub fn first_leaf_field(node: &ParserComponent) -> Option<&FieldParser> {
    match node {
        ParserComponent::Field(f) => Some(f),
        ParserComponent::Segment(s) => s.children.first().and_then(first_leaf_field),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_ordinal_forward() {
        assert_eq!(shift_position(FieldPosition::Ordinal(2), 3), FieldPosition::Ordinal(5));
    }

    #[test]
    fn shift_moves_fixed_offset_forward() {
        assert_eq!(
            shift_position(FieldPosition::Fixed { offset: 4, length: 6 }, 6),
            FieldPosition::Fixed { offset: 10, length: 6 }
        );
    }
}
