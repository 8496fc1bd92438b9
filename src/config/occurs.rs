/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/occurs.rs

    Declared min/max occurrence bounds, shared by `RecordConfig`,
    `GroupConfig`, and repeating `SegmentConfig` nodes.
*/

/// Declared min/max number of times a child may appear within its parent
/// group. `max = None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occurs {
    pub min: usize,
    pub max: Option<usize>,
}

impl Default for Occurs {
    fn default() -> Self {
        Occurs { min: 0, max: None }
    }
}

impl Occurs {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Occurs { min, max }
    }

    pub fn exactly(n: usize) -> Self {
        Occurs {
            min: n,
            max: Some(n),
        }
    }

    pub fn at_least(min: usize) -> Self {
        Occurs { min, max: None }
    }

    pub fn satisfied_by(&self, actual: usize) -> bool {
        actual >= self.min && self.max.map(|max| actual <= max).unwrap_or(true)
    }

    pub fn exceeds_max(&self, actual: usize) -> bool {
        self.max.map(|max| actual > max).unwrap_or(false)
    }
}

/// Ordering discipline for a [`crate::config::GroupConfig`]'s children:
/// `Sequential` children must appear in declared order; `Unordered`
/// children may appear in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ordering {
    #[default]
    Sequential,
    Unordered,
}

/// Left/right padding justification for fixed-length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Justify {
    #[default]
    Left,
    Right,
}
