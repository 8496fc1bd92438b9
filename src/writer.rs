/*
    beanio
    https://github.com/beanio-rs/beanio

    src/writer.rs

    The marshal driver: the mirror image of `crate::reader`. Walks the same
    parser tree, this time gathering field text from a `Value` into ordinal
    slots (delimited/CSV) or fixed-width byte spans (fixed-length), then
    hands the assembled field list to a `RecordWriter`.

    Delimited output back-fills any internal gap between position 0 and the
    highest position actually set with empty text, and stops there —
    trailing unset fields are simply omitted. Fixed-length output always
    emits every declared field at its full width, padded per its own
    `pad_character`/`justify`, since the format has no concept of a field
    being merely absent.
*/

use std::collections::BTreeMap;

use crate::context::MarshallingContext;
use crate::error::{BeanIoError, WriterError};
use crate::layout::{map_key_value_indices, node_name, node_width, shift_position};
use crate::parser::{FieldParser, ParserComponent, RecordParser, SegmentParser};
use crate::property::PropertyComponent;
use crate::record_io::RecordWriter;
use crate::stream::Stream;
use crate::value::Value;
use crate::{config::FieldPosition, config::Justify, StreamFormat};

fn child_value<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    match value {
        Value::Map(m) => m.get(name),
        Value::Object(_, m) => m.get(name),
        _ => None,
    }
}

fn pad_to_width(text: &str, width: usize, pad: char, justify: Justify) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() >= width {
        return chars[..width].iter().collect();
    }
    let padding: String = std::iter::repeat(pad).take(width - chars.len()).collect();
    match justify {
        Justify::Left => format!("{text}{padding}"),
        Justify::Right => format!("{padding}{text}"),
    }
}

fn marshal_field(
    field: &FieldParser,
    value: Option<&Value>,
    format: StreamFormat,
    shift: i64,
    record_name: &str,
    slots: &mut BTreeMap<usize, String>,
    fixed_slots: &mut Vec<(usize, usize, String, char, Justify)>,
) -> Result<(), WriterError> {
    let is_absent = matches!(value, None | Some(Value::Null));
    let text = match value {
        None | Some(Value::Null) => field.default_value.clone(),
        Some(v) => Some(field.property.handler.format(v)?),
    };

    if field.property.base.is_identifier && is_absent && field.default_value.is_none() {
        return Err(WriterError::MissingIdentifier {
            record: record_name.to_string(),
            field: field.property.base.name.clone(),
        });
    }

    let position = shift_position(field.position, shift);
    match (format, position) {
        (StreamFormat::FixedLength, FieldPosition::Fixed { offset, length }) => {
            fixed_slots.push((offset, length, text.unwrap_or_default(), field.pad_character, field.justify));
        }
        (StreamFormat::Delimited | StreamFormat::Csv, FieldPosition::Ordinal(ordinal)) => {
            if let Some(text) = text {
                slots.insert(ordinal, text);
            }
        }
        _ => {}
    }
    Ok(())
}

fn marshal_node(
    node: &ParserComponent,
    value: Option<&Value>,
    format: StreamFormat,
    shift: i64,
    record_name: &str,
    slots: &mut BTreeMap<usize, String>,
    fixed_slots: &mut Vec<(usize, usize, String, char, Justify)>,
) -> Result<(), WriterError> {
    match node {
        ParserComponent::Field(f) => marshal_field(f, value, format, shift, record_name, slots, fixed_slots),
        ParserComponent::Segment(s) => marshal_segment(
            s,
            value.unwrap_or(&Value::Null),
            format,
            shift,
            record_name,
            slots,
            fixed_slots,
        ),
        ParserComponent::Record(_) | ParserComponent::RecordGroup(_) | ParserComponent::Stream(_) => {
            unreachable!("a record/group/stream node never appears nested inside a segment")
        }
    }
}

fn marshal_segment(
    segment: &SegmentParser,
    value: &Value,
    format: StreamFormat,
    shift: i64,
    record_name: &str,
    slots: &mut BTreeMap<usize, String>,
    fixed_slots: &mut Vec<(usize, usize, String, char, Justify)>,
) -> Result<(), WriterError> {
    match &segment.property {
        PropertyComponent::Complex(_) => {
            for child in &segment.children {
                let child_val = child_value(value, &node_name(child));
                marshal_node(child, child_val, format, shift, record_name, slots, fixed_slots)?;
            }
            Ok(())
        }
        PropertyComponent::Collection(_) => {
            let items: &[Value] = value.as_sequence().unwrap_or(&[]);
            let stride = segment.children.iter().map(|c| node_width(c, format)).sum();
            for (index, item) in items.iter().enumerate() {
                let rep_shift = shift + index as i64 * stride;
                if segment.children.len() == 1 {
                    marshal_node(
                        &segment.children[0],
                        Some(item),
                        format,
                        rep_shift,
                        record_name,
                        slots,
                        fixed_slots,
                    )?;
                } else {
                    for child in &segment.children {
                        let child_val = child_value(item, &node_name(child));
                        marshal_node(child, child_val, format, rep_shift, record_name, slots, fixed_slots)?;
                    }
                }
            }
            Ok(())
        }
        PropertyComponent::Map(_) => {
            if segment.children.len() < 2 {
                return Ok(());
            }
            let (key_index, value_index) = map_key_value_indices(&segment.children);
            let stride = segment.children.iter().map(|c| node_width(c, format)).sum();
            let entries: Vec<(&String, &Value)> = value.as_map().map(|m| m.iter().collect()).unwrap_or_default();
            for (index, (key, entry_value)) in entries.into_iter().enumerate() {
                let rep_shift = shift + index as i64 * stride;
                marshal_node(
                    &segment.children[key_index],
                    Some(&Value::String(key.clone())),
                    format,
                    rep_shift,
                    record_name,
                    slots,
                    fixed_slots,
                )?;
                marshal_node(
                    &segment.children[value_index],
                    Some(entry_value),
                    format,
                    rep_shift,
                    record_name,
                    slots,
                    fixed_slots,
                )?;
            }
            Ok(())
        }
        PropertyComponent::Simple(_) => unreachable!("a SegmentParser's own property is never Simple"),
    }
}

fn render_fields(
    format: StreamFormat,
    slots: BTreeMap<usize, String>,
    mut fixed_slots: Vec<(usize, usize, String, char, Justify)>,
) -> Vec<String> {
    match format {
        StreamFormat::FixedLength => {
            fixed_slots.sort_by_key(|(offset, ..)| *offset);
            fixed_slots
                .into_iter()
                .map(|(_, length, text, pad, justify)| pad_to_width(&text, length, pad, justify))
                .collect()
        }
        _ => match slots.keys().max() {
            Some(&max) => (0..=max).map(|i| slots.get(&i).cloned().unwrap_or_default()).collect(),
            None => Vec::new(),
        },
    }
}

/// Marshals beans into text. Borrows the `Stream` it was opened from,
/// mirroring `Reader`'s relationship to it.
pub struct Writer<'s> {
    stream: &'s Stream,
    sink: Box<dyn RecordWriter>,
    ctx: MarshallingContext,
}

impl<'s> Writer<'s> {
    pub(crate) fn new(stream: &'s Stream, sink: Box<dyn RecordWriter>) -> Self {
        Writer {
            stream,
            sink,
            ctx: MarshallingContext::new(),
        }
    }

    /// Writes `value` using the stream's sole declared record definition.
    /// Returns `WriterError::UnknownRecord` if the stream declares zero or
    /// more than one record type — use [`Writer::write_named`] in that case.
    pub fn write(&mut self, value: &Value) -> Result<(), BeanIoError> {
        let record_name = self.stream.sole_record()?.name.clone();
        self.write_named(&record_name, value)
    }

    /// The name of the record definition the last `write`/`write_named`
    /// call targeted, or `None` before the first write.
    pub fn record_name(&self) -> Option<&str> {
        self.ctx.record_name.as_deref()
    }

    /// Writes `value` as an instance of the record named `record_name`.
    pub fn write_named(&mut self, record_name: &str, value: &Value) -> Result<(), BeanIoError> {
        let record: &RecordParser = self
            .stream
            .find_record(record_name)
            .ok_or_else(|| WriterError::UnknownRecord {
                record: record_name.to_string(),
            })?;
        self.ctx.begin_record(record_name.to_string());
        let format = self.stream.config().format;

        let mut slots = BTreeMap::new();
        let mut fixed_slots = Vec::new();
        marshal_segment(&record.root, value, format, 0, record_name, &mut slots, &mut fixed_slots)?;

        let fields = render_fields(format, slots, fixed_slots);
        self.sink.write_record(&fields)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), BeanIoError> {
        self.sink.flush()
    }

    pub fn close(&mut self) -> Result<(), BeanIoError> {
        self.sink.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, FieldPosition as FP, RecordConfig, StreamConfigBuilder};
    use crate::lexer::test_support::SharedBuf;
    use crate::StreamFormat as Fmt;
    use std::collections::BTreeMap as Map;

    fn flat_stream() -> Stream {
        let record = RecordConfig::new("detail")
            .field(FieldConfig::new("id", FP::Ordinal(0), "int"))
            .field(FieldConfig::new("name", FP::Ordinal(1), "string"));
        let config = StreamConfigBuilder::new()
            .with_name("flat")
            .with_format(Fmt::Delimited)
            .add_record(record)
            .build()
            .unwrap();
        Stream::compile(config).unwrap()
    }

    #[test]
    fn writes_a_flat_delimited_record_from_a_map() {
        let stream = flat_stream();
        let sink = SharedBuf::new();
        {
            let mut writer = stream.writer(sink.clone());
            let mut fields = Map::new();
            fields.insert("id".to_string(), Value::Int(7));
            fields.insert("name".to_string(), Value::String("Widget".to_string()));
            writer.write(&Value::Map(fields)).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(sink.as_string(), "7,Widget\n");
    }

    #[test]
    fn missing_required_identifier_errors() {
        let record = RecordConfig::new("detail")
            .identified_by("kind", crate::config::RecordIdentifier::Literal("HDR".to_string()))
            .field(FieldConfig::new("kind", FP::Ordinal(0), "string").identifier(true));
        let config = StreamConfigBuilder::new()
            .with_name("picky")
            .with_format(Fmt::Delimited)
            .add_record(record)
            .build()
            .unwrap();
        let stream = Stream::compile(config).unwrap();
        let sink = SharedBuf::new();
        let mut writer = stream.writer(sink);
        let err = writer.write(&Value::Map(Map::new())).unwrap_err();
        assert!(matches!(
            err,
            BeanIoError::Writer(WriterError::MissingIdentifier { .. })
        ));
    }
}
