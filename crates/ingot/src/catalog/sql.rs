//! Catalog stored in a `data_tables` table on a [`StorageEngine`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::{MetadataStore, NewTableRecord, TableMetadata};
use crate::error::{IngotError, Result};
use crate::schema::SchemaMap;
use crate::store::{SqlValue, StorageEngine};

const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS data_tables (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        table_name TEXT NOT NULL,
        original_filename TEXT NOT NULL,
        column_count BIGINT NOT NULL,
        row_count BIGINT NOT NULL,
        table_schema TEXT NOT NULL,
        physical_table_name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_data_tables_owner_id ON data_tables(owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_data_tables_physical_name ON data_tables(physical_table_name)",
];

const COLUMNS: &str = "id, owner_id, table_name, original_filename, column_count, row_count, \
                       table_schema, physical_table_name, created_at";

/// Metadata store sharing the storage engine that holds the tables.
#[derive(Clone)]
pub struct SqlCatalog {
    engine: Arc<dyn StorageEngine>,
}

impl SqlCatalog {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    fn param(&self, index: usize) -> String {
        self.engine.dialect().placeholder(index)
    }
}

#[async_trait]
impl MetadataStore for SqlCatalog {
    async fn migrate(&self) -> Result<()> {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            self.engine
                .execute(migration, &[])
                .await
                .map_err(|e| IngotError::Catalog(format!("migration {} failed: {}", i + 1, e)))?;
        }
        Ok(())
    }

    async fn insert(&self, record: NewTableRecord) -> Result<TableMetadata> {
        let metadata = TableMetadata {
            id: Uuid::new_v4().to_string(),
            owner_id: record.owner_id,
            table_name: record.table_name,
            original_filename: record.original_filename,
            column_count: record.column_count,
            row_count: record.row_count,
            table_schema: record.table_schema,
            physical_table_name: record.physical_table_name,
            created_at: Utc::now(),
        };

        let placeholders: Vec<String> = (1..=9).map(|i| self.param(i)).collect();
        let sql = format!(
            "INSERT INTO data_tables ({}) VALUES ({})",
            COLUMNS,
            placeholders.join(", ")
        );
        let params = [
            SqlValue::from(metadata.id.as_str()),
            SqlValue::from(metadata.owner_id.as_str()),
            SqlValue::from(metadata.table_name.as_str()),
            SqlValue::from(metadata.original_filename.as_str()),
            SqlValue::Integer(metadata.column_count as i64),
            SqlValue::Integer(metadata.row_count as i64),
            SqlValue::Text(serde_json::to_string(&metadata.table_schema)?),
            SqlValue::from(metadata.physical_table_name.as_str()),
            SqlValue::Text(metadata.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        ];

        self.engine
            .execute(&sql, &params)
            .await
            .map_err(|e| IngotError::Catalog(format!("failed to store table metadata: {}", e)))?;

        Ok(metadata)
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<TableMetadata>> {
        let sql = format!(
            "SELECT {} FROM data_tables WHERE id = {} AND owner_id = {}",
            COLUMNS,
            self.param(1),
            self.param(2)
        );
        let rows = self
            .engine
            .query(&sql, &[SqlValue::from(id), SqlValue::from(owner_id)])
            .await?;
        rows.into_iter().next().map(decode_record).transpose()
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<TableMetadata>> {
        let sql = format!(
            "SELECT {} FROM data_tables WHERE owner_id = {} ORDER BY created_at DESC",
            COLUMNS,
            self.param(1)
        );
        let rows = self.engine.query(&sql, &[SqlValue::from(owner_id)]).await?;
        rows.into_iter().map(decode_record).collect()
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<bool> {
        let sql = format!(
            "DELETE FROM data_tables WHERE id = {} AND owner_id = {}",
            self.param(1),
            self.param(2)
        );
        let affected = self
            .engine
            .execute(&sql, &[SqlValue::from(id), SqlValue::from(owner_id)])
            .await?;
        Ok(affected > 0)
    }

    async fn physical_name_taken(&self, physical_name: &str) -> Result<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM data_tables WHERE physical_table_name = {}",
            self.param(1)
        );
        let rows = self.engine.query(&sql, &[SqlValue::from(physical_name)]).await?;
        let count = rows
            .first()
            .and_then(|row| row.first())
            .and_then(SqlValue::as_i64)
            .unwrap_or(0);
        Ok(count > 0)
    }
}

fn decode_record(row: Vec<SqlValue>) -> Result<TableMetadata> {
    let mut cells = row.into_iter();
    let mut next = |field: &str| {
        cells
            .next()
            .ok_or_else(|| IngotError::Catalog(format!("missing column '{}'", field)))
    };

    let text = |value: SqlValue, field: &str| {
        value
            .into_text()
            .ok_or_else(|| IngotError::Catalog(format!("column '{}' is not text", field)))
    };
    let count = |value: SqlValue, field: &str| {
        value
            .as_i64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| IngotError::Catalog(format!("column '{}' is not a count", field)))
    };

    let id = text(next("id")?, "id")?;
    let owner_id = text(next("owner_id")?, "owner_id")?;
    let table_name = text(next("table_name")?, "table_name")?;
    let original_filename = text(next("original_filename")?, "original_filename")?;
    let column_count = count(next("column_count")?, "column_count")?;
    let row_count = count(next("row_count")?, "row_count")?;
    let table_schema: SchemaMap = serde_json::from_str(&text(next("table_schema")?, "table_schema")?)?;
    let physical_table_name = text(next("physical_table_name")?, "physical_table_name")?;
    let created_at = DateTime::parse_from_rfc3339(&text(next("created_at")?, "created_at")?)
        .map_err(|e| IngotError::Catalog(format!("invalid created_at: {}", e)))?
        .with_timezone(&Utc);

    Ok(TableMetadata {
        id,
        owner_id,
        table_name,
        original_filename,
        column_count,
        row_count,
        table_schema,
        physical_table_name,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnType, SchemaEntry};
    use crate::store::SqliteEngine;

    async fn catalog() -> SqlCatalog {
        let engine = SqliteEngine::in_memory().await.unwrap();
        let catalog = SqlCatalog::new(Arc::new(engine));
        catalog.migrate().await.unwrap();
        catalog
    }

    fn record(owner: &str, physical: &str) -> NewTableRecord {
        let mut schema = SchemaMap::new();
        schema.insert(
            "zeta".to_string(),
            SchemaEntry {
                column_type: ColumnType::Integer,
                sample: "1".to_string(),
            },
        );
        schema.insert(
            "alpha".to_string(),
            SchemaEntry {
                column_type: ColumnType::Text,
                sample: "a".to_string(),
            },
        );
        NewTableRecord {
            owner_id: owner.to_string(),
            table_name: "Sales".to_string(),
            original_filename: "sales.csv".to_string(),
            column_count: 2,
            row_count: 10,
            table_schema: schema,
            physical_table_name: physical.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let catalog = catalog().await;
        let stored = catalog.insert(record("owner-aaaa", "user_owner_aa_sales")).await.unwrap();

        let fetched = catalog.get("owner-aaaa", &stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.table_name, "Sales");
        assert_eq!(fetched.row_count, 10);
        // Schema order is preserved, not sorted.
        assert_eq!(fetched.column_names(), vec!["zeta", "alpha"]);
        assert_eq!(fetched.created_at.timestamp(), stored.created_at.timestamp());
    }

    #[tokio::test]
    async fn test_scoped_to_owner() {
        let catalog = catalog().await;
        let stored = catalog.insert(record("owner-aaaa", "p1")).await.unwrap();

        assert!(catalog.get("owner-bbbb", &stored.id).await.unwrap().is_none());
        assert!(!catalog.delete("owner-bbbb", &stored.id).await.unwrap());
        assert!(catalog.list("owner-bbbb").await.unwrap().is_empty());

        assert!(catalog.delete("owner-aaaa", &stored.id).await.unwrap());
        assert!(catalog.get("owner-aaaa", &stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_physical_name_taken() {
        let catalog = catalog().await;
        assert!(!catalog.physical_name_taken("p1").await.unwrap());
        catalog.insert(record("owner-aaaa", "p1")).await.unwrap();
        assert!(catalog.physical_name_taken("p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let catalog = catalog().await;
        catalog.migrate().await.unwrap();
    }
}
