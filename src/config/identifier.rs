/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/identifier.rs

    A record identifier selects which record definition applies to an
    incoming record. It names one field (by declared name within the
    record) and a literal-or-regex match against that field's raw text.
*/

/// How an identifier field's text is matched against a candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordIdentifier {
    Literal(String),
    Regex(String),
}

impl RecordIdentifier {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            RecordIdentifier::Literal(expected) => expected == text,
            RecordIdentifier::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(text))
                .unwrap_or(false),
        }
    }
}
