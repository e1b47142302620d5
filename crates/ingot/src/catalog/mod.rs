//! Metadata records describing provisioned tables.

mod sql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::SchemaMap;

pub use sql::SqlCatalog;

/// A provisioned table as recorded in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub id: String,
    pub owner_id: String,
    /// User-chosen label.
    pub table_name: String,
    pub original_filename: String,
    pub column_count: usize,
    pub row_count: usize,
    /// Column name to type and sample, in column order.
    pub table_schema: SchemaMap,
    pub physical_table_name: String,
    pub created_at: DateTime<Utc>,
}

impl TableMetadata {
    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.table_schema.keys().map(String::as_str).collect()
    }
}

/// Everything needed to record a table; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewTableRecord {
    pub owner_id: String,
    pub table_name: String,
    pub original_filename: String,
    pub column_count: usize,
    pub row_count: usize,
    pub table_schema: SchemaMap,
    pub physical_table_name: String,
}

/// Durable store of table metadata records.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create backing storage if it does not exist yet.
    async fn migrate(&self) -> Result<()>;

    /// Persist a record and return it with its generated id.
    async fn insert(&self, record: NewTableRecord) -> Result<TableMetadata>;

    /// Fetch one of the owner's records.
    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<TableMetadata>>;

    /// All of the owner's records, newest first.
    async fn list(&self, owner_id: &str) -> Result<Vec<TableMetadata>>;

    /// Delete one of the owner's records. Returns false if none matched.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool>;

    /// True when any record already points at `physical_name`.
    async fn physical_name_taken(&self, physical_name: &str) -> Result<bool>;
}
