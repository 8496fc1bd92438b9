/*
    beanio
    https://github.com/beanio-rs/beanio

    src/lexer/delimited.rs

    Delimited (and CSV-like) record tokenizer: one line is one record, split
    on `LexerOptions::field_delimiter`, with optional quoting so a field can
    embed the delimiter, the quote character itself (doubled, CSV-style), or
    a newline. `Reader` (see `crate::reader`) extracts individual field text
    from `RawRecord::fields` by ordinal index once it knows which
    `RecordParser` matched.
*/

use std::io::{BufRead, Write};

use crate::error::BeanIoError;
use crate::lexer::LexerOptions;
use crate::record_io::{RawRecord, RecordParserFactory, RecordReader, RecordWriter};

pub struct DelimitedRecordReader {
    input: Box<dyn BufRead + Send>,
    options: LexerOptions,
    line_number: u64,
}

impl DelimitedRecordReader {
    pub fn new(input: Box<dyn BufRead + Send>, options: LexerOptions) -> Self {
        DelimitedRecordReader {
            input,
            options,
            line_number: 0,
        }
    }

    fn split_fields(&self, line: &str) -> Vec<String> {
        let quote = self.options.quote_char;
        let delim = self.options.field_delimiter;
        let mut fields = Vec::new();
        let mut chars = line.chars().peekable();

        loop {
            let mut field = String::new();
            if quote.is_some() && chars.peek().copied() == quote {
                let q = quote.unwrap();
                chars.next();
                while let Some(c) = chars.next() {
                    if c == q {
                        if chars.peek() == Some(&q) {
                            field.push(q);
                            chars.next();
                        } else {
                            break;
                        }
                    } else {
                        field.push(c);
                    }
                }
                // Anything between the closing quote and the next delimiter
                // is discarded rather than treated as a malformed record.
                while let Some(&c) = chars.peek() {
                    if c == delim {
                        break;
                    }
                    chars.next();
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c == delim {
                        break;
                    }
                    field.push(c);
                    chars.next();
                }
            }
            fields.push(field);
            if chars.peek() == Some(&delim) {
                chars.next();
            } else {
                break;
            }
        }
        fields
    }
}

impl RecordReader for DelimitedRecordReader {
    fn read_record(&mut self) -> Result<Option<RawRecord>, BeanIoError> {
        loop {
            let mut buf = String::new();
            let read = self.input.read_line(&mut buf)?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = buf.trim_end_matches(['\n', '\r']);

            if self
                .options
                .comment_prefixes
                .iter()
                .any(|prefix| line.starts_with(prefix.as_str()))
            {
                continue;
            }

            let fields = self.split_fields(line);
            return Ok(Some(RawRecord {
                line_number: self.line_number,
                raw_text: line.to_string(),
                fields: Some(fields),
            }));
        }
    }

    fn close(&mut self) -> Result<(), BeanIoError> {
        Ok(())
    }
}

pub struct DelimitedRecordWriter {
    output: Box<dyn Write + Send>,
    options: LexerOptions,
}

impl DelimitedRecordWriter {
    pub fn new(output: Box<dyn Write + Send>, options: LexerOptions) -> Self {
        DelimitedRecordWriter { output, options }
    }

    fn quote_if_needed(&self, field: &str) -> String {
        let Some(quote) = self.options.quote_char else {
            return field.to_string();
        };
        let needs_quoting =
            field.contains(self.options.field_delimiter) || field.contains(quote) || field.contains(['\n', '\r']);
        if !needs_quoting {
            return field.to_string();
        }
        let doubled = field.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{doubled}{quote}")
    }
}

impl RecordWriter for DelimitedRecordWriter {
    fn write_record(&mut self, fields: &[String]) -> Result<(), BeanIoError> {
        let line = fields
            .iter()
            .map(|f| self.quote_if_needed(f))
            .collect::<Vec<_>>()
            .join(&self.options.field_delimiter.to_string());
        self.output.write_all(line.as_bytes())?;
        self.output.write_all(self.options.record_terminator.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BeanIoError> {
        self.output.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BeanIoError> {
        self.flush()
    }
}

#[derive(Debug, Clone)]
pub struct DelimitedParserFactory {
    options: LexerOptions,
}

impl DelimitedParserFactory {
    pub fn new(options: LexerOptions) -> Self {
        DelimitedParserFactory { options }
    }
}

impl RecordParserFactory for DelimitedParserFactory {
    fn create_reader(&self, input: Box<dyn BufRead + Send>) -> Box<dyn RecordReader> {
        Box::new(DelimitedRecordReader::new(input, self.options.clone()))
    }

    fn create_writer(&self, output: Box<dyn Write + Send>) -> Box<dyn RecordWriter> {
        Box::new(DelimitedRecordWriter::new(output, self.options.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> DelimitedRecordReader {
        DelimitedRecordReader::new(Box::new(Cursor::new(text.as_bytes().to_vec())), LexerOptions::default())
    }

    #[test]
    fn splits_plain_fields() {
        let mut r = reader("George,Gary,Jon,1,2,3,4\n");
        let rec = r.read_record().unwrap().unwrap();
        assert_eq!(
            rec.fields.unwrap(),
            vec!["George", "Gary", "Jon", "1", "2", "3", "4"]
        );
    }

    #[test]
    fn quoted_field_may_embed_delimiter() {
        let mut r = reader("\"a,b\",c\n");
        let rec = r.read_record().unwrap().unwrap();
        assert_eq!(rec.fields.unwrap(), vec!["a,b", "c"]);
    }

    #[test]
    fn skips_comment_lines() {
        let mut options = LexerOptions::default();
        options.comment_prefixes = vec!["#".to_string()];
        let mut r = DelimitedRecordReader::new(
            Box::new(Cursor::new(b"# a comment\na,b\n".to_vec())),
            options,
        );
        let rec = r.read_record().unwrap().unwrap();
        assert_eq!(rec.fields.unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn end_of_input_returns_none() {
        let mut r = reader("");
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn writer_quotes_fields_containing_delimiter() {
        let shared = crate::lexer::test_support::SharedBuf::new();
        let mut w = DelimitedRecordWriter::new(Box::new(shared.clone()), LexerOptions::default());
        w.write_record(&["a,b".to_string(), "c".to_string()]).unwrap();
        assert_eq!(shared.as_string(), "\"a,b\",c\n");
    }
}
