/*
    beanio
    https://github.com/beanio-rs/beanio

    src/config/mod.rs

    The declarative stream configuration tree. Everything in this module is
    plain, cloneable, comparable data — no behavior beyond small constructor
    helpers and builders. The preprocessor (`crate::preprocessor`) is the
    only thing that validates it; the parser factory (`crate::compiler`) is
    the only thing that lowers it into a runtime tree.
*/

pub mod bean;
pub mod field;
pub mod identifier;
pub mod occurs;
pub mod record;
pub mod segment;
pub mod stream;

pub use bean::BeanSpec;
pub use field::{FieldConfig, FieldPosition};
pub use identifier::RecordIdentifier;
pub use occurs::{Justify, Occurs, Ordering};
pub use record::{GroupConfig, GroupNode, RecordConfig};
pub use segment::{Aggregation, RecordNode, SegmentConfig};
pub use stream::{StreamConfig, StreamConfigBuilder};
