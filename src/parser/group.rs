/*
    beanio
    https://github.com/beanio-rs/beanio

    src/parser/group.rs

    Record-group pushdown recognizer: tracks how many times each child of a
    `RecordGroupParser` has matched and enforces the group's ordering
    discipline.

    - `Sequential`: children must appear in declared order. A child may
      repeat up to its own max before the cursor advances to the next
      child; encountering a later child's identifier while the current
      child hasn't met its min raises `RecordError::OutOfSequence` — an
      earlier child forecloses once skipped past, it cannot match again.
    - `Unordered`: children may appear in any order; each child's own
      min/max is tracked independently with no ordering constraint between
      them.
*/

use crate::error::RecordError;
use crate::parser::RecordGroupParser;

pub struct GroupCursor<'a> {
    group: &'a RecordGroupParser,
    counts: Vec<usize>,
    /// Index of the child the `Sequential` cursor currently expects, or one
    /// past the last child once every child has been exhausted.
    sequential_index: usize,
}

impl<'a> GroupCursor<'a> {
    pub fn new(group: &'a RecordGroupParser) -> Self {
        GroupCursor {
            group,
            counts: vec![0; group.children.len()],
            sequential_index: 0,
        }
    }

    /// The group this cursor tracks occurrences for.
    pub fn group(&self) -> &'a RecordGroupParser {
        self.group
    }

    /// Records a match against the child named `name`. Returns the matched
    /// child's index, or an error if the match violates the group's
    /// ordering discipline or the child's own max occurrence.
    pub fn record_match(&mut self, name: &str) -> Result<usize, RecordError> {
        let Some(index) = self.group.children.iter().position(|c| c.name() == name) else {
            return Err(RecordError::UnidentifiedRecord { line: 0 });
        };

        match self.group.ordering {
            crate::config::Ordering::Unordered => {
                self.check_max(index)?;
                self.counts[index] += 1;
                Ok(index)
            }
            crate::config::Ordering::Sequential => {
                if index < self.sequential_index {
                    return Err(RecordError::OutOfSequence {
                        group: self.group.name.clone(),
                        record: name.to_string(),
                    });
                }
                if index > self.sequential_index {
                    self.check_min_satisfied_up_to(index)?;
                    self.sequential_index = index;
                }
                self.check_max(index)?;
                self.counts[index] += 1;
                Ok(index)
            }
        }
    }

    fn check_max(&self, index: usize) -> Result<(), RecordError> {
        let child = &self.group.children[index];
        let occurs = child.occurs();
        if occurs.exceeds_max(self.counts[index] + 1) {
            return Err(RecordError::OccurrenceViolation {
                group: self.group.name.clone(),
                record: child.name().to_string(),
                actual: self.counts[index] + 1,
                min: occurs.min,
                max: occurs.max.unwrap_or(usize::MAX),
            });
        }
        Ok(())
    }

    fn check_min_satisfied_up_to(&self, advancing_to: usize) -> Result<(), RecordError> {
        for i in self.sequential_index..advancing_to {
            let child = &self.group.children[i];
            let occurs = child.occurs();
            if !occurs.satisfied_by(self.counts[i]) {
                return Err(RecordError::OccurrenceViolation {
                    group: self.group.name.clone(),
                    record: child.name().to_string(),
                    actual: self.counts[i],
                    min: occurs.min,
                    max: occurs.max.unwrap_or(usize::MAX),
                });
            }
        }
        Ok(())
    }

    /// Validates that every child met its min occurrence — called at group
    /// boundary (end of input, or an enclosing group's next sibling).
    pub fn finalize(&self) -> Result<(), RecordError> {
        for (i, child) in self.group.children.iter().enumerate() {
            let occurs = child.occurs();
            if !occurs.satisfied_by(self.counts[i]) {
                return Err(RecordError::OccurrenceViolation {
                    group: self.group.name.clone(),
                    record: child.name().to_string(),
                    actual: self.counts[i],
                    min: occurs.min,
                    max: occurs.max.unwrap_or(usize::MAX),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroupConfig, Occurs, Ordering, RecordConfig};
    use crate::parser::{GroupChild, RecordParser, SegmentParser};
    use crate::property::{ComplexProperty, PropertyBase, PropertyComponent};

    fn stub_record(name: &str, occurs: Occurs) -> RecordParser {
        RecordParser {
            name: name.to_string(),
            occurs,
            identifier: None,
            root: SegmentParser {
                occurs: Occurs::exactly(1),
                property: PropertyComponent::Complex(ComplexProperty {
                    base: PropertyBase {
                        name: name.to_string(),
                        is_identifier: false,
                        constructor_arg_index: None,
                    },
                    bean: None,
                    children: Vec::new(),
                }),
                children: Vec::new(),
            },
        }
    }

    fn sequential_group() -> RecordGroupParser {
        let _ = GroupConfig::new("g").ordering(Ordering::Sequential);
        let _ = RecordConfig::new("header");
        RecordGroupParser {
            name: "g".to_string(),
            occurs: Occurs::default(),
            ordering: Ordering::Sequential,
            allow_unidentified: false,
            children: vec![
                GroupChild::Record(stub_record("header", Occurs::exactly(1))),
                GroupChild::Record(stub_record("detail", Occurs::at_least(0))),
                GroupChild::Record(stub_record("trailer", Occurs::exactly(1))),
            ],
        }
    }

    #[test]
    fn sequential_allows_forward_progress_and_repeats() {
        let group = sequential_group();
        let mut cursor = GroupCursor::new(&group);
        cursor.record_match("header").unwrap();
        cursor.record_match("detail").unwrap();
        cursor.record_match("detail").unwrap();
        cursor.record_match("trailer").unwrap();
        cursor.finalize().unwrap();
    }

    #[test]
    fn sequential_rejects_backward_match() {
        let group = sequential_group();
        let mut cursor = GroupCursor::new(&group);
        cursor.record_match("header").unwrap();
        cursor.record_match("trailer").unwrap();
        assert!(matches!(
            cursor.record_match("header"),
            Err(RecordError::OutOfSequence { .. })
        ));
    }

    #[test]
    fn finalize_reports_missing_required_child() {
        let group = sequential_group();
        let cursor = GroupCursor::new(&group);
        assert!(matches!(
            cursor.finalize(),
            Err(RecordError::OccurrenceViolation { .. })
        ));
    }

    #[test]
    fn unordered_allows_any_sequence() {
        let group = RecordGroupParser {
            name: "g".to_string(),
            occurs: Occurs::default(),
            ordering: Ordering::Unordered,
            allow_unidentified: false,
            children: vec![
                GroupChild::Record(stub_record("a", Occurs::exactly(1))),
                GroupChild::Record(stub_record("b", Occurs::exactly(1))),
            ],
        };
        let mut cursor = GroupCursor::new(&group);
        cursor.record_match("b").unwrap();
        cursor.record_match("a").unwrap();
        cursor.finalize().unwrap();
    }
}
