//! Schema types for representing inferred table structure.

mod column;
mod types;

pub use column::{ColumnDescriptor, SchemaEntry, SchemaMap};
pub use types::ColumnType;
