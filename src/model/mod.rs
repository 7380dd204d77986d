pub mod types;

pub use types::{FieldKeys, FieldMap, LogicalField, ResultItem};
