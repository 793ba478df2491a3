//! Phoneme catalog: viseme categories, class membership and label mapping.

pub mod catalog;
pub mod labels;

pub use catalog::Phoneme;
pub use labels::{map_label, map_label_with_duration};
