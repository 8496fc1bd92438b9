/*
    beanio
    https://github.com/beanio-rs/beanio

    src/stream.rs

    `Stream` is the compiled, reusable artifact produced from a
    `StreamConfig`: the runtime parser tree plus every registry the
    reader/writer drivers consult while walking it. Compilation is two
    passes — `preprocessor::preprocess` validates and defaults the
    configuration, `compiler::compile` lowers it into a `StreamParser` —
    followed by selecting the format's `RecordParserFactory` from
    `crate::lexer`.

    Every field is cheap to clone (`Arc`-backed trees, `dashmap`-backed
    registries, a `dyn_clone` factory), so a compiled `Stream` is meant to be
    built once and shared across however many concurrent `Reader`/`Writer`
    instances a caller opens from it: compile once, drive many short-lived
    cursors off the shared result.
*/

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::accessor::AccessorRegistry;
use crate::beanfactory::BeanFactoryRegistry;
use crate::compiler;
use crate::config::StreamConfig;
use crate::error::{BeanIoError, WriterError};
use crate::lexer::{self, LexerOptions};
use crate::parser::{GroupChild, RecordGroupParser, RecordParser, StreamParser};
use crate::preprocessor;
use crate::reader::Reader;
use crate::record_io::RecordParserFactory;
use crate::typehandler::TypeHandlerRegistry;
use crate::writer::Writer;

fn find_record_in<'s>(group: &'s RecordGroupParser, name: &str) -> Option<&'s RecordParser> {
    for child in &group.children {
        match child {
            GroupChild::Record(record) if record.name == name => return Some(record),
            GroupChild::Record(_) => {}
            GroupChild::Group(group) => {
                if let Some(found) = find_record_in(group, name) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn collect_all_records<'s>(group: &'s RecordGroupParser, out: &mut Vec<&'s RecordParser>) {
    for child in &group.children {
        match child {
            GroupChild::Record(record) => out.push(record),
            GroupChild::Group(group) => collect_all_records(group, out),
        }
    }
}

/// A compiled, thread-shareable mapping between a stream's text layout and
/// its bean bindings. Obtain one with [`Stream::compile`], then open as
/// many [`Reader`]s and [`Writer`]s from it as needed.
#[derive(Clone)]
pub struct Stream {
    config: Arc<StreamConfig>,
    parser: Arc<StreamParser>,
    type_handlers: TypeHandlerRegistry,
    bean_factory: BeanFactoryRegistry,
    accessors: AccessorRegistry,
    record_parsers: Box<dyn RecordParserFactory>,
}

impl Stream {
    /// Compiles `config` with fresh, builtin-seeded registries. Most callers
    /// want this; use [`Stream::compile_with`] to supply registries already
    /// populated with application-specific bean constructors and accessors.
    pub fn compile(config: StreamConfig) -> Result<Self, BeanIoError> {
        Stream::compile_with(
            config,
            TypeHandlerRegistry::with_defaults(),
            BeanFactoryRegistry::new(),
            AccessorRegistry::new(),
        )
    }

    /// Compiles `config` against caller-supplied registries, so an
    /// application can register its own bean constructors, accessors, and
    /// type handlers before compilation resolves field handlers and
    /// constructor bindings against them.
    pub fn compile_with(
        mut config: StreamConfig,
        type_handlers: TypeHandlerRegistry,
        bean_factory: BeanFactoryRegistry,
        accessors: AccessorRegistry,
    ) -> Result<Self, BeanIoError> {
        preprocessor::preprocess(&mut config, &type_handlers)?;
        let parser = compiler::compile(&config, &type_handlers, &bean_factory)?;

        let options = LexerOptions {
            field_delimiter: config.field_delimiter,
            ..LexerOptions::default()
        };
        let record_parsers = lexer::create_factory(config.format, options)?;

        Ok(Stream {
            config: Arc::new(config),
            parser: Arc::new(parser),
            type_handlers,
            bean_factory,
            accessors,
            record_parsers,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn bean_factory(&self) -> &BeanFactoryRegistry {
        &self.bean_factory
    }

    pub fn accessors(&self) -> &AccessorRegistry {
        &self.accessors
    }

    /// Finds a declared record definition by name, anywhere in the group
    /// tree, for [`Writer::write_named`].
    pub fn find_record(&self, name: &str) -> Option<&RecordParser> {
        find_record_in(&self.parser.root, name)
    }

    /// The stream's sole declared record definition, for [`Writer::write`]'s
    /// single-record convenience. Errs if the stream declares zero or more
    /// than one.
    pub(crate) fn sole_record(&self) -> Result<&RecordParser, WriterError> {
        let mut all = Vec::new();
        collect_all_records(&self.parser.root, &mut all);
        match all.len() {
            1 => Ok(all[0]),
            0 => Err(WriterError::UnknownRecord {
                record: "<none declared>".to_string(),
            }),
            _ => Err(WriterError::UnknownRecord {
                record: "<ambiguous: multiple records declared>".to_string(),
            }),
        }
    }

    /// Opens a [`Reader`] over `input`, borrowing this `Stream` for as long
    /// as the reader is alive.
    pub fn reader<'s>(&'s self, input: impl BufRead + Send + 'static) -> Reader<'s> {
        let source = self.record_parsers.create_reader(Box::new(input));
        Reader::new(self, source)
    }

    /// Opens a [`Writer`] over `output`, borrowing this `Stream` for as long
    /// as the writer is alive.
    pub fn writer<'s>(&'s self, output: impl Write + Send + 'static) -> Writer<'s> {
        let sink = self.record_parsers.create_writer(Box::new(output));
        Writer::new(self, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, FieldPosition, RecordConfig, StreamConfigBuilder};
    use crate::lexer::test_support::SharedBuf;
    use crate::StreamFormat;

    fn build() -> Stream {
        let record = RecordConfig::new("detail").field(FieldConfig::new("id", FieldPosition::Auto, "int"));
        let config = StreamConfigBuilder::new()
            .with_name("roundtrip")
            .with_format(StreamFormat::Delimited)
            .add_record(record)
            .build()
            .unwrap();
        Stream::compile(config).unwrap()
    }

    #[test]
    fn compiled_stream_exposes_its_name_and_record() {
        let stream = build();
        assert_eq!(stream.name(), "roundtrip");
        assert!(stream.find_record("detail").is_some());
        assert!(stream.find_record("missing").is_none());
    }

    #[test]
    fn sole_record_fails_when_stream_declares_none() {
        let config = StreamConfigBuilder::new()
            .with_name("empty")
            .with_format(StreamFormat::Delimited)
            .build()
            .unwrap();
        let stream = Stream::compile(config).unwrap();
        assert!(stream.sole_record().is_err());
    }

    #[test]
    fn reader_and_writer_share_one_compiled_stream() {
        let stream = build();
        let mut reader = stream.reader(std::io::Cursor::new(b"7\n".to_vec()));
        let value = reader.read().unwrap().unwrap();
        assert_eq!(value.as_map().unwrap().get("id"), Some(&crate::value::Value::Int(7)));

        let sink = SharedBuf::new();
        let mut writer = stream.writer(sink.clone());
        writer.write(&value).unwrap();
        writer.flush().unwrap();
        assert_eq!(sink.as_string(), "7\n");
    }

    #[test]
    fn unknown_format_xml_fails_to_compile() {
        let config = StreamConfigBuilder::new()
            .with_name("xml")
            .with_format(StreamFormat::Xml)
            .build()
            .unwrap();
        assert!(Stream::compile(config).is_err());
    }
}
