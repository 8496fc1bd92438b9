/*
    beanio
    https://github.com/beanio-rs/beanio

    src/reader.rs

    The unmarshal driver: identifies which `RecordParser` matches an
    incoming `RawRecord`, walks its property tree extracting field text
    into a `Value`, and tracks occurrence state across successive `read()`
    calls through a `GroupState` tree shadowing the compiled
    `RecordGroupParser` nesting.

    `Reader<'s>` borrows its `Stream` rather than owning a clone of the
    compiled tree: one long-lived compiled root, many short-lived borrowing
    views over it.
*/

use std::collections::BTreeMap;

use crate::beanfactory::BeanFactoryRegistry;
use crate::config::FieldPosition;
use crate::context::UnmarshallingContext;
use crate::error::{BeanIoError, FieldError, RecordError};
use crate::layout::{first_leaf_field, map_key_value_indices, node_ctor_index, node_name, node_width, shift_position};
use crate::parser::group::GroupCursor;
use crate::parser::{FieldParser, GroupChild, ParserComponent, RecordGroupParser, RecordParser, SegmentParser};
use crate::property::PropertyComponent;
use crate::record_io::{RawRecord, RecordReader};
use crate::stream::Stream;
use crate::value::Value;
use crate::StreamFormat;

/// Mirrors a `RecordGroupParser`'s nesting so occurrence counts persist
/// across `read()` calls without the `Reader` owning the parser tree itself.
struct GroupState<'s> {
    cursor: GroupCursor<'s>,
    nested: Vec<Option<Box<GroupState<'s>>>>,
}

impl<'s> GroupState<'s> {
    fn build(group: &'s RecordGroupParser) -> Self {
        let nested = group
            .children
            .iter()
            .map(|child| match child {
                GroupChild::Group(g) => Some(Box::new(GroupState::build(g))),
                GroupChild::Record(_) => None,
            })
            .collect();
        GroupState {
            cursor: GroupCursor::new(group),
            nested,
        }
    }

    fn finalize(&self) -> Result<(), RecordError> {
        self.cursor.finalize()?;
        for nested in self.nested.iter().flatten() {
            nested.finalize()?;
        }
        Ok(())
    }
}

/// Recursively finds which record (anywhere in the group tree rooted at
/// `state`) matches `raw`, advancing the ordering cursors along the way.
fn try_match<'s>(
    state: &mut GroupState<'s>,
    raw: &RawRecord,
    format: StreamFormat,
) -> Result<Option<&'s RecordParser>, RecordError> {
    // `group()` hands back a plain `&'s RecordGroupParser` (a `Copy` reference),
    // so iterating its children holds no borrow against `state` itself and
    // `state.cursor`/`state.nested` remain free to mutate inside the loop.
    let group = state.cursor.group();
    for (index, child) in group.children.iter().enumerate() {
        match child {
            GroupChild::Record(record) => {
                if record_identifies(record, raw, format) {
                    state.cursor.record_match(&record.name)?;
                    return Ok(Some(record));
                }
            }
            GroupChild::Group(g) => {
                if let Some(nested) = state.nested[index].as_mut() {
                    if let Some(record) = try_match(nested, raw, format)? {
                        state.cursor.record_match(&g.name)?;
                        return Ok(Some(record));
                    }
                }
            }
        }
    }
    Ok(None)
}

fn record_identifies(record: &RecordParser, raw: &RawRecord, format: StreamFormat) -> bool {
    let Some(identifier) = &record.identifier else {
        return true;
    };
    let Some(field) = find_field(&record.root.children, &identifier.field_name) else {
        return false;
    };
    match extract_text(&field.position, raw, format) {
        Some(text) => identifier.matches(text.trim_matches(field.pad_character)),
        None => false,
    }
}

fn find_field<'s>(children: &'s [ParserComponent], name: &str) -> Option<&'s FieldParser> {
    for child in children {
        match child {
            ParserComponent::Field(f) if f.property.base.name == name => return Some(f),
            ParserComponent::Segment(s) => {
                if let Some(found) = find_field(&s.children, name) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn extract_text(position: &FieldPosition, raw: &RawRecord, format: StreamFormat) -> Option<String> {
    match format {
        StreamFormat::Delimited | StreamFormat::Csv => {
            let ordinal = position.ordinal()?;
            raw.fields.as_ref()?.get(ordinal).cloned()
        }
        StreamFormat::FixedLength => {
            if let FieldPosition::Fixed { offset, length } = position {
                let chars: Vec<char> = raw.raw_text.chars().collect();
                if *offset >= chars.len() {
                    return None;
                }
                let end = (*offset + *length).min(chars.len());
                Some(chars[*offset..end].iter().collect())
            } else {
                None
            }
        }
        StreamFormat::Xml => None,
    }
}

fn with_context(err: FieldError, record: &str, field: &str, line: u64, text: &str) -> FieldError {
    match err {
        FieldError::TypeConversion { cause, .. } => FieldError::TypeConversion {
            record: record.to_string(),
            field: field.to_string(),
            line,
            text: text.to_string(),
            cause,
        },
        other => other,
    }
}

fn unmarshal_field(
    field: &FieldParser,
    raw: &RawRecord,
    format: StreamFormat,
    shift: i64,
    record_name: &str,
    line_number: u64,
) -> Result<Value, FieldError> {
    let position = shift_position(field.position, shift);
    let raw_text = extract_text(&position, raw, format);

    let text = raw_text.and_then(|t| {
        let trimmed = if format == StreamFormat::FixedLength {
            t.trim_matches(field.pad_character).to_string()
        } else {
            t
        };
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    });

    let Some(text) = text else {
        if field.required {
            return Err(FieldError::RequiredFieldMissing {
                record: record_name.to_string(),
                field: field.property.base.name.clone(),
                line: line_number,
            });
        }
        return match &field.default_value {
            Some(default) => field
                .property
                .handler
                .parse(default)
                .map_err(|e| with_context(e, record_name, &field.property.base.name, line_number, default)),
            None => Ok(Value::Null),
        };
    };

    let length = text.chars().count();
    if let Some(min) = field.min_length {
        if length < min {
            return Err(FieldError::LengthOutOfBounds {
                record: record_name.to_string(),
                field: field.property.base.name.clone(),
                line: line_number,
                actual: length,
                min,
                max: field.max_length.unwrap_or(usize::MAX),
            });
        }
    }
    if let Some(max) = field.max_length {
        if length > max {
            return Err(FieldError::LengthOutOfBounds {
                record: record_name.to_string(),
                field: field.property.base.name.clone(),
                line: line_number,
                actual: length,
                min: field.min_length.unwrap_or(0),
                max,
            });
        }
    }
    if let Some(pattern) = &field.pattern {
        if !pattern.is_match(&text) {
            return Err(FieldError::PatternMismatch {
                record: record_name.to_string(),
                field: field.property.base.name.clone(),
                line: line_number,
                text: text.clone(),
            });
        }
    }

    field
        .property
        .handler
        .parse(&text)
        .map_err(|e| with_context(e, record_name, &field.property.base.name, line_number, &text))
}

/// True if the leftmost leaf field of a repeated Collection/Map element
/// actually has text present at `shift` — used to decide whether the Nth
/// repetition occurred at all in this record.
fn repetition_present(children: &[ParserComponent], raw: &RawRecord, format: StreamFormat, shift: i64) -> bool {
    let Some(first) = children.first().and_then(first_leaf_field) else {
        return false;
    };
    let position = shift_position(first.position, shift);
    extract_text(&position, raw, format)
        .map(|t| !t.trim_matches(first.pad_character).is_empty())
        .unwrap_or(false)
}

fn unmarshal_node(
    node: &ParserComponent,
    raw: &RawRecord,
    format: StreamFormat,
    shift: i64,
    record_name: &str,
    line_number: u64,
    beans: &BeanFactoryRegistry,
) -> Result<Value, BeanIoError> {
    match node {
        ParserComponent::Field(f) => Ok(unmarshal_field(f, raw, format, shift, record_name, line_number)?),
        ParserComponent::Segment(s) => unmarshal_segment(s, raw, format, shift, record_name, line_number, beans),
        ParserComponent::Record(_) | ParserComponent::RecordGroup(_) | ParserComponent::Stream(_) => {
            unreachable!("a record/group/stream node never appears nested inside a segment")
        }
    }
}

fn unmarshal_segment(
    segment: &SegmentParser,
    raw: &RawRecord,
    format: StreamFormat,
    shift: i64,
    record_name: &str,
    line_number: u64,
    beans: &BeanFactoryRegistry,
) -> Result<Value, BeanIoError> {
    match &segment.property {
        PropertyComponent::Complex(complex) => {
            let mut fields = BTreeMap::new();
            let mut ctor_args: Vec<Option<Value>> = Vec::new();
            for child in &segment.children {
                let value = unmarshal_node(child, raw, format, shift, record_name, line_number, beans)?;
                if let Some(index) = node_ctor_index(child) {
                    if ctor_args.len() <= index {
                        ctor_args.resize(index + 1, None);
                    }
                    ctor_args[index] = Some(value.clone());
                }
                fields.insert(node_name(child), value);
            }
            match &complex.bean {
                Some(bean) => {
                    let built = beans.construct_selected(&bean.class_name, bean.constructor, ctor_args);
                    Ok(match built {
                        Value::Object(name, mut members) => {
                            members.extend(fields);
                            Value::Object(name, members)
                        }
                        other => other,
                    })
                }
                None => Ok(Value::Map(fields)),
            }
        }
        PropertyComponent::Collection(_) => {
            let stride = segment.children.iter().map(|c| node_width(c, format)).sum();
            let mut items = Vec::new();
            let mut repetition = 0usize;
            loop {
                if let Some(max) = segment.occurs.max {
                    if repetition >= max {
                        break;
                    }
                }
                let rep_shift = shift + repetition as i64 * stride;
                if !repetition_present(&segment.children, raw, format, rep_shift) {
                    break;
                }
                let value = if segment.children.len() == 1 {
                    unmarshal_node(&segment.children[0], raw, format, rep_shift, record_name, line_number, beans)?
                } else {
                    let mut members = BTreeMap::new();
                    for child in &segment.children {
                        members.insert(
                            node_name(child),
                            unmarshal_node(child, raw, format, rep_shift, record_name, line_number, beans)?,
                        );
                    }
                    Value::Map(members)
                };
                items.push(value);
                repetition += 1;
            }
            if items.len() < segment.occurs.min {
                return Err(BeanIoError::Record(RecordError::OccurrenceViolation {
                    group: record_name.to_string(),
                    record: segment.property.name().to_string(),
                    actual: items.len(),
                    min: segment.occurs.min,
                    max: segment.occurs.max.unwrap_or(usize::MAX),
                }));
            }
            Ok(Value::Sequence(items))
        }
        PropertyComponent::Map(_) => {
            if segment.children.len() < 2 {
                return Ok(Value::Map(BTreeMap::new()));
            }
            let (key_index, value_index) = map_key_value_indices(&segment.children);
            let stride = segment.children.iter().map(|c| node_width(c, format)).sum();
            let mut out = BTreeMap::new();
            let mut repetition = 0usize;
            loop {
                if let Some(max) = segment.occurs.max {
                    if repetition >= max {
                        break;
                    }
                }
                let rep_shift = shift + repetition as i64 * stride;
                if !repetition_present(&segment.children, raw, format, rep_shift) {
                    break;
                }
                let key = unmarshal_node(
                    &segment.children[key_index],
                    raw,
                    format,
                    rep_shift,
                    record_name,
                    line_number,
                    beans,
                )?;
                let value = unmarshal_node(
                    &segment.children[value_index],
                    raw,
                    format,
                    rep_shift,
                    record_name,
                    line_number,
                    beans,
                )?;
                out.insert(key.to_string(), value);
                repetition += 1;
            }
            if out.len() < segment.occurs.min {
                return Err(BeanIoError::Record(RecordError::OccurrenceViolation {
                    group: record_name.to_string(),
                    record: segment.property.name().to_string(),
                    actual: out.len(),
                    min: segment.occurs.min,
                    max: segment.occurs.max.unwrap_or(usize::MAX),
                }));
            }
            Ok(Value::Map(out))
        }
        PropertyComponent::Simple(_) => unreachable!("a SegmentParser's own property is never Simple"),
    }
}

/// Unmarshals text into beans. Borrows the `Stream` it was opened from, so
/// a compiled stream can be shared across many concurrent readers without
/// recompiling.
pub struct Reader<'s> {
    stream: &'s Stream,
    source: Box<dyn RecordReader>,
    state: GroupState<'s>,
    ctx: UnmarshallingContext,
    error_handler: Option<Box<dyn FnMut(&BeanIoError)>>,
}

impl<'s> Reader<'s> {
    pub(crate) fn new(stream: &'s Stream, source: Box<dyn RecordReader>) -> Self {
        Reader {
            stream,
            source,
            state: GroupState::build(&stream.parser().root),
            ctx: UnmarshallingContext::new(),
            error_handler: None,
        }
    }

    /// Installs a callback invoked with every error this reader surfaces,
    /// in addition to (not instead of) returning it from `read()`.
    pub fn on_error(&mut self, handler: impl FnMut(&BeanIoError) + 'static) {
        self.error_handler = Some(Box::new(handler));
    }

    /// The name of the record definition the last successful `read()`
    /// matched, or `None` before the first read or after end of input.
    pub fn record_name(&self) -> Option<&str> {
        self.ctx.record_name.as_deref()
    }

    pub fn line_number(&self) -> u64 {
        self.ctx.line_number
    }

    /// Reads and unmarshals the next record, or `Ok(None)` at end of input.
    /// At end of input every tracked group's occurrence minimums are
    /// checked, surfacing a missing-trailer-style error exactly once.
    pub fn read(&mut self) -> Result<Option<Value>, BeanIoError> {
        loop {
            let raw = match self.source.read_record() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.ctx.record_name = None;
                    self.state.finalize()?;
                    return Ok(None);
                }
                Err(err) => return Err(self.report(err)),
            };
            self.ctx.line_number = raw.line_number;

            let format = self.stream.config().format;
            let matched = match try_match(&mut self.state, &raw, format) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    let err = BeanIoError::Record(RecordError::UnidentifiedRecord { line: raw.line_number });
                    if self.stream.parser().root.allow_unidentified {
                        self.notify(&err);
                        continue;
                    }
                    return Err(self.report_owned(err));
                }
                Err(e) => return Err(self.report(e)),
            };

            self.ctx.begin_record(matched.name.clone());
            return unmarshal_segment(
                &matched.root,
                &raw,
                format,
                0,
                &matched.name,
                raw.line_number,
                self.stream.bean_factory(),
            )
            .map(Some)
            .map_err(|e| self.report_owned(e));
        }
    }

    pub fn close(&mut self) -> Result<(), BeanIoError> {
        self.source.close()
    }

    fn notify(&mut self, err: &BeanIoError) {
        if let Some(handler) = &mut self.error_handler {
            handler(err);
        }
    }

    fn report<E: Into<BeanIoError>>(&mut self, err: E) -> BeanIoError {
        self.report_owned(err.into())
    }

    fn report_owned(&mut self, err: BeanIoError) -> BeanIoError {
        self.notify(&err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Aggregation, FieldConfig, FieldPosition as FP, Occurs, RecordConfig, RecordIdentifier, SegmentConfig,
        StreamConfigBuilder,
    };
    use crate::{StreamFormat as Fmt, StreamMode};
    use std::io::Cursor;

    fn flat_stream() -> Stream {
        let record = RecordConfig::new("detail")
            .field(FieldConfig::new("id", FP::Ordinal(0), "int"))
            .field(FieldConfig::new("name", FP::Ordinal(1), "string"));
        let config = StreamConfigBuilder::new()
            .with_name("flat")
            .with_format(Fmt::Delimited)
            .with_mode(StreamMode::ReadWrite)
            .add_record(record)
            .build()
            .unwrap();
        Stream::compile(config).unwrap()
    }

    #[test]
    fn reads_a_flat_delimited_record_into_a_map() {
        let stream = flat_stream();
        let mut reader = stream.reader(Cursor::new(b"1,Widget\n".to_vec()));
        let value = reader.read().unwrap().unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("id"), Some(&Value::Int(1)));
        assert_eq!(map.get("name"), Some(&Value::String("Widget".to_string())));
        assert_eq!(reader.record_name(), Some("detail"));
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn unidentified_record_without_allow_unidentified_errors() {
        let record = RecordConfig::new("detail")
            .identified_by("kind", RecordIdentifier::Literal("HDR".to_string()))
            .field(FieldConfig::new("kind", FP::Ordinal(0), "string").identifier(true));
        let config = StreamConfigBuilder::new()
            .with_name("picky")
            .with_format(Fmt::Delimited)
            .add_record(record)
            .build()
            .unwrap();
        let stream = Stream::compile(config).unwrap();
        let mut reader = stream.reader(Cursor::new(b"nope\n".to_vec()));
        let err = reader.read().unwrap_err();
        assert!(matches!(err, BeanIoError::Record(RecordError::UnidentifiedRecord { .. })));
    }

    #[test]
    fn collection_segment_short_of_declared_minimum_errors() {
        let record = RecordConfig::new("detail").segment(
            SegmentConfig::new("list", Aggregation::Collection)
                .occurs(Occurs::new(2, Some(3)))
                .field(FieldConfig::new("value", FP::Ordinal(0), "string")),
        );
        let config = StreamConfigBuilder::new()
            .with_name("names")
            .with_format(Fmt::Delimited)
            .add_record(record)
            .build()
            .unwrap();
        let stream = Stream::compile(config).unwrap();

        let mut reader = stream.reader(Cursor::new(b"George\n".to_vec()));
        let err = reader.read().unwrap_err();
        assert!(matches!(err, BeanIoError::Record(RecordError::OccurrenceViolation { .. })));
    }
}
