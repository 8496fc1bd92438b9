/*
    beanio
    https://github.com/beanio-rs/beanio

    src/record_io.rs

    Pluggable per-format tokenizer interface. A `RecordReader` turns a text
    stream into successive raw records; a `RecordWriter` turns field text
    back into a written record. Field *extraction* from a raw record (by
    ordinal index for delimited/CSV, by byte offset for fixed-length) is the
    `Reader`'s job once it knows which `RecordParser` matched — these
    traits only know how to find record boundaries; a separate layer
    interprets the framed data.

    A reader/writer instance owns a live `io::Read`/`io::Write` handle, so it
    is not itself cloneable. The *factory* that produces one per `Stream`
    (the thing `src/lexer` registers one implementation of per format) is the
    piece that needs to be cloned alongside the rest of an immutable, shared
    `Stream` — hence `dyn_clone` applies to `RecordParserFactory`, not to
    `RecordReader`/`RecordWriter` themselves.
*/

use std::io::{BufRead, Write};

use dyn_clone::DynClone;

use crate::error::BeanIoError;

/// One raw record read from the underlying stream. Delimited/CSV readers
/// populate `fields`; fixed-length readers leave it `None` and hand back
/// `raw_text` for the `Reader` to slice by byte offset once a record
/// definition has matched.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub line_number: u64,
    pub raw_text: String,
    pub fields: Option<Vec<String>>,
}

/// Reads successive raw records from a per-format text encoding.
pub trait RecordReader: Send {
    fn read_record(&mut self) -> Result<Option<RawRecord>, BeanIoError>;
    fn close(&mut self) -> Result<(), BeanIoError>;
}

/// Writes successive records back into a per-format text encoding.
pub trait RecordWriter: Send {
    /// `fields` are already formatted text, in declared position order.
    fn write_record(&mut self, fields: &[String]) -> Result<(), BeanIoError>;
    fn flush(&mut self) -> Result<(), BeanIoError>;
    fn close(&mut self) -> Result<(), BeanIoError>;
}

/// Produces a `RecordReader`/`RecordWriter` bound to a particular underlying
/// stream, for one configured format. `Stream` holds one boxed factory,
/// selected at compile time from `src/lexer`'s dispatch table, and clones it
/// (cheaply — factories carry only formatting options, never open handles)
/// into every `Reader`/`Writer` it creates.
pub trait RecordParserFactory: DynClone + Send + Sync {
    fn create_reader(&self, input: Box<dyn BufRead + Send>) -> Box<dyn RecordReader>;
    fn create_writer(&self, output: Box<dyn Write + Send>) -> Box<dyn RecordWriter>;
}
dyn_clone::clone_trait_object!(RecordParserFactory);
