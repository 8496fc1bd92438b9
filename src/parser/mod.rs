/*
    beanio
    https://github.com/beanio-rs/beanio

    src/parser/mod.rs

    The compiled parser tree: how text maps to records, as opposed to
    `crate::property`'s tree of what the records bind to in memory. The
    parser factory (`crate::compiler`) builds one of these per
    `StreamConfig`; `Reader`/`Writer` walk it to identify, read, and write
    records.

    Each parser node owns the `crate::property::PropertyComponent` it binds
    to directly rather than maintaining a second, separately-indexed tree in
    parallel — a `SegmentParser`'s own `children` list is the single source
    of truth for traversal order, so the `PropertyComponent::Complex` it
    carries is built with an empty `children` vec (populated structurally by
    this tree instead). Dispatch across the five component kinds is a plain
    enum match.
*/

pub mod group;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::{Justify, Occurs, Ordering, RecordIdentifier};
use crate::config::FieldPosition;
use crate::property::{PropertyComponent, SimpleProperty};

/// A record identifier with its regex, if any, precompiled once at compile
/// time rather than on every candidate match (see the note in
/// `crate::config::identifier`).
pub struct CompiledIdentifier {
    pub field_name: String,
    source: RecordIdentifier,
    regex: OnceCell<Option<Regex>>,
}

impl CompiledIdentifier {
    pub fn new(field_name: impl Into<String>, source: RecordIdentifier) -> Self {
        CompiledIdentifier {
            field_name: field_name.into(),
            source,
            regex: OnceCell::new(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.source {
            RecordIdentifier::Literal(expected) => expected == text,
            RecordIdentifier::Regex(pattern) => {
                let compiled = self.regex.get_or_init(|| Regex::new(pattern).ok());
                compiled.as_ref().map(|re| re.is_match(text)).unwrap_or(false)
            }
        }
    }
}

/// A single scalar field's parsing rule, bound to its `SimpleProperty`.
pub struct FieldParser {
    pub position: FieldPosition,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub default_value: Option<String>,
    pub pad_character: char,
    pub justify: Justify,
    pub property: SimpleProperty,
}

/// A bundle of fields/segments aggregated per `property`'s `Aggregation`.
pub struct SegmentParser {
    pub occurs: Occurs,
    pub property: PropertyComponent,
    pub children: Vec<ParserComponent>,
}

/// One record definition: an identifier (if any) plus its field/segment
/// tree, rooted at an implicit top-level `Complex` segment.
pub struct RecordParser {
    pub name: String,
    pub occurs: Occurs,
    pub identifier: Option<CompiledIdentifier>,
    pub root: SegmentParser,
}

/// A child of a [`RecordGroupParser`]: either a leaf record or a nested
/// group.
pub enum GroupChild {
    Record(RecordParser),
    Group(RecordGroupParser),
}

impl GroupChild {
    pub fn name(&self) -> &str {
        match self {
            GroupChild::Record(r) => &r.name,
            GroupChild::Group(g) => &g.name,
        }
    }

    pub fn occurs(&self) -> Occurs {
        match self {
            GroupChild::Record(r) => r.occurs,
            GroupChild::Group(g) => g.occurs,
        }
    }
}

/// A group of records/nested groups under an ordering discipline.
/// `group::GroupCursor` drives the sequential/unordered recognizer over a
/// `RecordGroupParser`'s children.
pub struct RecordGroupParser {
    pub name: String,
    pub occurs: Occurs,
    pub ordering: Ordering,
    pub allow_unidentified: bool,
    pub children: Vec<GroupChild>,
}

/// The compiled stream root: an implicit top-level group holding every
/// declared record/group.
pub struct StreamParser {
    pub name: String,
    pub root: RecordGroupParser,
}

/// The five runtime component kinds. Dispatch happens by matching on the
/// variant.
pub enum ParserComponent {
    Field(FieldParser),
    Segment(SegmentParser),
    Record(RecordParser),
    RecordGroup(RecordGroupParser),
    Stream(StreamParser),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_identifier_matches_exact_text() {
        let id = CompiledIdentifier::new("kind", RecordIdentifier::Literal("DTL".to_string()));
        assert!(id.matches("DTL"));
        assert!(!id.matches("HDR"));
    }

    #[test]
    fn regex_identifier_compiles_once_and_matches() {
        let id = CompiledIdentifier::new("kind", RecordIdentifier::Regex("^DTL\\d+$".to_string()));
        assert!(id.matches("DTL42"));
        assert!(!id.matches("HDR42"));
        // second call exercises the cached path
        assert!(id.matches("DTL7"));
    }
}
