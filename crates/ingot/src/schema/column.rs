//! Column descriptors produced by inference.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Sanitized column identifier.
    pub name: String,
    /// Inferred storage type.
    pub inferred_type: ColumnType,
    /// First observed raw value, for display only.
    pub sample_value: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, inferred_type: ColumnType, sample_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type,
            sample_value: sample_value.into(),
        }
    }
}

/// Per-column entry of the schema stored with a table's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub sample: String,
}

/// Column name to schema entry, in source column order.
pub type SchemaMap = IndexMap<String, SchemaEntry>;

impl From<&ColumnDescriptor> for SchemaEntry {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            column_type: column.inferred_type,
            sample: column.sample_value.clone(),
        }
    }
}
