/*
    beanio
    https://github.com/beanio-rs/beanio

    Copyright (c) 2026 The beanio-rs Contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the "Software"),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

//! # beanio
//!
//! beanio is a bidirectional mapping engine between flat text records
//! (delimited, fixed-length, and XML-like) and in-memory structured values
//! ("beans": aggregates with named members, ordered sequences, keyed
//! mappings, and scalars).
//!
//! A caller builds a [`config::StreamConfig`] describing the layout of
//! records within a stream and the binding of fields to members of a target
//! bean. From that configuration, [`Stream::compile`] produces an executable
//! parser tree and hands back a [`Stream`] object exposing two dual
//! capabilities: a [`Reader`] that unmarshals text into beans, and a
//! [`Writer`] that marshals beans back into text.
//!
//! It is recommended to build a [`config::StreamConfig`] with the
//! [`config::StreamConfigBuilder`] and then call [`Stream::compile`] to
//! obtain a reusable, thread-shareable [`Stream`].

pub mod accessor;
pub mod beanfactory;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod layout;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod property;
pub mod reader;
pub mod record_io;
mod stream;
pub mod typehandler;
pub mod value;
pub mod writer;

pub use crate::config::{
    BeanSpec, FieldConfig, GroupConfig, Ordering, RecordConfig, RecordIdentifier, SegmentConfig,
    StreamConfig, StreamConfigBuilder,
};
pub use crate::error::{BeanIoError, ConfigError, FieldError, RecordError, WriterError};
pub use crate::reader::Reader;
pub use crate::stream::Stream;
pub use crate::value::Value;
pub use crate::writer::Writer;

/// The stream's textual format, determining which record tokenizer and field
/// positioning scheme applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamFormat {
    Delimited,
    FixedLength,
    Xml,
    Csv,
}

/// The direction(s) a compiled [`Stream`] supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamMode {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl StreamMode {
    pub fn can_read(&self) -> bool {
        matches!(self, StreamMode::Read | StreamMode::ReadWrite)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, StreamMode::Write | StreamMode::ReadWrite)
    }
}

/// Default single-character escape used by synthesized sequence handlers
/// and the escaping string/char handlers when a stream does not override
/// it.
pub const DEFAULT_ESCAPE_CHAR: char = '\\';
