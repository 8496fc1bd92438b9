/*
    beanio
    https://github.com/beanio-rs/beanio

    Copyright (c) 2026 The beanio-rs Contributors

    src/error.rs

    Error kinds raised by the configuration compiler and by the reader/writer
    runtime. One enum per concern: configuration errors abort stream
    creation; field/record/writer errors are surfaced to callers without
    aborting the whole read or write.
*/

use thiserror::Error;

/// Raised while compiling a [`crate::config::StreamConfig`] into a [`crate::Stream`].
/// Fatal: a stream that fails to compile is never returned to the caller, and
/// compilation is never retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("record '{record}' declares position {position} more than once")]
    DuplicatePosition { record: String, position: usize },

    #[error("field '{field}' in record '{record}' is out of order for a {format} stream")]
    PositionOutOfOrder {
        record: String,
        field: String,
        format: String,
    },

    #[error("bean '{bean}' constructor-argument indices are not contiguous 0..{expected}")]
    NonContiguousConstructorArgs { bean: String, expected: usize },

    #[error("record identifier for '{record}' is not unique within group '{group}'")]
    DuplicateIdentifier { group: String, record: String },

    #[error("no type handler resolvable for field '{field}' (type '{type_name}') in a {format} stream")]
    UnresolvableTypeHandler {
        field: String,
        type_name: String,
        format: String,
    },

    #[error("named type handler '{name}' is not registered for a {format} stream")]
    UnknownNamedTypeHandler { name: String, format: String },

    #[error("field '{field}' is write-only but the stream mode is read-only")]
    WriteOnlyInReadMode { field: String },

    #[error("field '{field}' is read-only but the stream mode is write-only")]
    ReadOnlyInWriteMode { field: String },

    #[error("a simple property '{name}' cannot have children")]
    SimplePropertyHasChildren { name: String },

    #[error("no public constructor on bean '{bean}' is assignable from its {arity} constructor-argument children")]
    NoMatchingConstructor { bean: String, arity: usize },

    #[error("cyclic reference detected while compiling '{node}'")]
    CyclicConfiguration { node: String },

    #[error("neither property nor field accessor found for '{name}' on bean '{bean}'")]
    NoAccessorFound { bean: String, name: String },

    #[error("stream configuration is missing required field '{field}'")]
    MissingRequiredConfig { field: String },
}

/// A single field failed to parse. Carries enough context for the reader's
/// error handler to report `(record_name, field_name, line_number, text, cause)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field '{field}' in record '{record}' at line {line}: could not parse '{text}': {cause}")]
    TypeConversion {
        record: String,
        field: String,
        line: u64,
        text: String,
        cause: String,
    },

    #[error("field '{field}' in record '{record}' at line {line}: required but missing")]
    RequiredFieldMissing {
        record: String,
        field: String,
        line: u64,
    },

    #[error("field '{field}' in record '{record}' at line {line}: length {actual} out of bounds [{min}, {max}]")]
    LengthOutOfBounds {
        record: String,
        field: String,
        line: u64,
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("field '{field}' in record '{record}' at line {line}: value '{text}' does not match pattern")]
    PatternMismatch {
        record: String,
        field: String,
        line: u64,
        text: String,
    },

    #[error("this type handler does not support formatting (escape handlers are parse-only)")]
    FormatNotSupported,
}

/// Raised at the record level: identification or occurrence failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("at line {line}: no record definition matched the input")]
    UnidentifiedRecord { line: u64 },

    #[error("group '{group}', record '{record}': occurred {actual} times, expected {min}..{max}")]
    OccurrenceViolation {
        group: String,
        record: String,
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("group '{group}': record '{record}' appeared out of declared sequential order")]
    OutOfSequence { group: String, record: String },
}

/// Raised while marshalling a bean back into text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriterError {
    #[error("record '{record}': identifier field '{field}' could not be produced")]
    MissingIdentifier { record: String, field: String },

    #[error("no record named '{record}' is configured for writing")]
    UnknownRecord { record: String },

    #[error("{0}")]
    Field(#[from] FieldError),
}

/// The crate-wide error type returned by fallible top-level operations
/// (`Stream::compile`, `Reader::read`, `Writer::write`).
#[derive(Debug, Error)]
pub enum BeanIoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("an IO error occurred reading or writing the stream: {0}")]
    Io(String),
}

impl From<std::io::Error> for BeanIoError {
    fn from(err: std::io::Error) -> Self {
        BeanIoError::Io(err.to_string())
    }
}
