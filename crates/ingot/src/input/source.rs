//! Parsed datasets and source metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{ColumnDescriptor, SchemaMap, SchemaEntry};

/// Metadata about the uploaded source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Original file name as supplied by the uploader.
    pub file: String,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the source was parsed.
    pub parsed_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(
        file: impl Into<String>,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            file: file.into(),
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            parsed_at: Utc::now(),
        }
    }
}

/// Parsed tabular data with its inferred schema.
///
/// Rows keep their raw text; a row shorter than `columns` is treated as
/// padded with absent values, and longer rows are never truncated here.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column descriptors in source order.
    pub columns: Vec<ColumnDescriptor>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl Dataset {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            columns,
            rows,
            delimiter,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a specific cell value. Missing trailing cells yield `None`.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Schema map as stored in the table's metadata record.
    pub fn schema_map(&self) -> SchemaMap {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), SchemaEntry::from(c)))
            .collect()
    }
}
