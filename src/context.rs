/*
    beanio
    https://github.com/beanio-rs/beanio

    src/context.rs

    Per-operation transient state: the parser and property trees are
    immutable for the life of a `Stream`, so anything that changes while
    reading or writing one record lives here instead, never mutated onto
    the tree itself.
*/

/// State threaded through one `Reader::read()` call and carried across
/// calls for line/record bookkeeping.
#[derive(Debug, Default, Clone)]
pub struct UnmarshallingContext {
    pub line_number: u64,
    pub record_name: Option<String>,
}

impl UnmarshallingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_record(&mut self, record_name: impl Into<String>) {
        self.record_name = Some(record_name.into());
    }

    pub fn advance_line(&mut self) {
        self.line_number += 1;
    }
}

/// State threaded through one `Writer::write()` call.
#[derive(Debug, Default, Clone)]
pub struct MarshallingContext {
    pub record_name: Option<String>,
}

impl MarshallingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_record(&mut self, record_name: impl Into<String>) {
        self.record_name = Some(record_name.into());
    }
}
