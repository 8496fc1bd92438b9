/*
    beanio
    https://github.com/beanio-rs/beanio

    tests/end_to_end.rs

    Exercises `Stream`/`Reader`/`Writer` together against realistic
    round-trip scenarios, rather than any single module in isolation.
*/

use beanio::config::{
    Aggregation, FieldConfig, FieldPosition, Justify, Occurs, Ordering, RecordConfig,
    RecordIdentifier, SegmentConfig, StreamConfigBuilder,
};
use beanio::value::Value;
use beanio::{BeanIoError, RecordError, Stream, StreamFormat};
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

/// An in-memory `io::Write` sink that stays readable after a `Writer` takes
/// ownership of it — a `Box<dyn Write + Send + 'static>` can't borrow a
/// local `Vec<u8>` directly.
#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn new() -> Self {
        SharedBuf(Arc::new(Mutex::new(Vec::new())))
    }

    fn as_string(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn delimited_collection_round_trip() {
    let record = RecordConfig::new("detail")
        .segment(
            SegmentConfig::new("list", Aggregation::Collection)
                .occurs(Occurs::new(1, Some(3)))
                .field(FieldConfig::new("value", FieldPosition::Ordinal(0), "string")),
        )
        .segment(
            SegmentConfig::new("array", Aggregation::Collection)
                .occurs(Occurs::new(1, Some(4)))
                .field(FieldConfig::new("value", FieldPosition::Ordinal(3), "int")),
        );
    let config = StreamConfigBuilder::new()
        .with_name("names")
        .with_format(StreamFormat::Delimited)
        .add_record(record)
        .build()
        .unwrap();
    let stream = Stream::compile(config).unwrap();

    let mut reader = stream.reader(Cursor::new(b"George,Gary,Jon,1,2,3,4\n".to_vec()));
    let value = reader.read().unwrap().unwrap();
    let map = value.as_map().unwrap();
    assert_eq!(
        map.get("list"),
        Some(&Value::Sequence(vec![
            Value::String("George".to_string()),
            Value::String("Gary".to_string()),
            Value::String("Jon".to_string()),
        ]))
    );
    assert_eq!(
        map.get("array"),
        Some(&Value::Sequence(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4),
        ]))
    );
    assert!(reader.read().unwrap().is_none());

    let sink = SharedBuf::new();
    let mut writer = stream.writer(sink.clone());
    writer.write(&value).unwrap();
    writer.flush().unwrap();
    assert_eq!(sink.as_string(), "George,Gary,Jon,1,2,3,4\n");
}

#[test]
fn fixed_length_back_fill_and_padding() {
    let record = RecordConfig::new("detail")
        .field(
            FieldConfig::new("id", FieldPosition::Fixed { offset: 0, length: 3 }, "int")
                .padding(' ', Justify::Right),
        )
        .field(FieldConfig::new(
            "unused",
            FieldPosition::Fixed { offset: 3, length: 5 },
            "string",
        ))
        .field(FieldConfig::new(
            "model",
            FieldPosition::Fixed { offset: 8, length: 5 },
            "string",
        ));
    let config = StreamConfigBuilder::new()
        .with_name("widgets")
        .with_format(StreamFormat::FixedLength)
        .add_record(record)
        .build()
        .unwrap();
    let stream = Stream::compile(config).unwrap();

    let mut fields = std::collections::BTreeMap::new();
    fields.insert("id".to_string(), Value::Int(1));
    fields.insert("model".to_string(), Value::String("model".to_string()));

    let sink = SharedBuf::new();
    let mut writer = stream.writer(sink.clone());
    writer.write(&Value::Map(fields)).unwrap();
    writer.flush().unwrap();
    assert_eq!(sink.as_string(), "  1     model\n");
}

fn record_with_identifier(name: &str, literal: &str) -> RecordConfig {
    RecordConfig::new(name)
        .identified_by("kind", RecordIdentifier::Literal(literal.to_string()))
        .field(FieldConfig::new("kind", FieldPosition::Ordinal(0), "string").identifier(true))
        .field(FieldConfig::new("num", FieldPosition::Ordinal(1), "int"))
        .field(FieldConfig::new("name", FieldPosition::Ordinal(2), "string"))
}

#[test]
fn unordered_group_dispatches_regardless_of_declared_order() {
    let config = StreamConfigBuilder::new()
        .with_name("dispatch")
        .with_format(StreamFormat::Delimited)
        .with_ordering(Ordering::Unordered)
        .add_record(record_with_identifier("r1", "R1"))
        .add_record(record_with_identifier("r2", "R2"))
        .add_record(record_with_identifier("r3", "R3"))
        .build()
        .unwrap();
    let stream = Stream::compile(config).unwrap();

    let mut reader = stream.reader(Cursor::new(b"R2,2,name2\nR1,1,name1\n".to_vec()));
    let first = reader.read().unwrap().unwrap();
    assert_eq!(reader.record_name(), Some("r2"));
    assert_eq!(first.as_map().unwrap().get("name"), Some(&Value::String("name2".to_string())));

    let second = reader.read().unwrap().unwrap();
    assert_eq!(reader.record_name(), Some("r1"));
    assert_eq!(second.as_map().unwrap().get("name"), Some(&Value::String("name1".to_string())));

    assert!(reader.read().unwrap().is_none());
}

#[test]
fn sequential_group_rejects_out_of_order_records() {
    let config = StreamConfigBuilder::new()
        .with_name("dispatch")
        .with_format(StreamFormat::Delimited)
        .with_ordering(Ordering::Sequential)
        .add_record(record_with_identifier("r1", "R1"))
        .add_record(record_with_identifier("r2", "R2"))
        .add_record(record_with_identifier("r3", "R3"))
        .build()
        .unwrap();
    let stream = Stream::compile(config).unwrap();

    let mut reader = stream.reader(Cursor::new(b"R2,2,name2\nR1,1,name1\n".to_vec()));
    assert!(reader.read().unwrap().is_some());
    let err = reader.read().unwrap_err();
    assert!(matches!(err, BeanIoError::Record(RecordError::OutOfSequence { .. })));
}
