//! Table provisioning: DDL for an inferred schema and row loading.

mod coerce;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{IngotError, Result};
use crate::sanitize::is_safe_identifier;
use crate::schema::ColumnDescriptor;
use crate::store::{quote_ident, SqlValue, StorageEngine};

pub use coerce::coerce_cell;

/// Creates physical tables and loads rows through a storage engine.
pub struct TableProvisioner<'a> {
    engine: &'a dyn StorageEngine,
}

impl<'a> TableProvisioner<'a> {
    pub fn new(engine: &'a dyn StorageEngine) -> Self {
        Self { engine }
    }

    /// Build the `CREATE TABLE` statement for a schema.
    ///
    /// The engine-managed identity column comes first, then one column per
    /// descriptor, then the creation timestamp.
    pub fn create_table_sql(&self, physical_name: &str, columns: &[ColumnDescriptor]) -> String {
        let dialect = self.engine.dialect();
        let mut defs = Vec::with_capacity(columns.len() + 2);
        defs.push(dialect.identity_column().to_string());
        for column in columns {
            defs.push(format!(
                "{} {}",
                quote_ident(&column.name),
                dialect.storage_type(column.inferred_type)
            ));
        }
        defs.push(dialect.created_at_column().to_string());

        format!("CREATE TABLE {} ({})", quote_ident(physical_name), defs.join(", "))
    }

    /// Build the parameterized `INSERT` statement for a schema.
    pub fn insert_sql(&self, physical_name: &str, columns: &[ColumnDescriptor]) -> String {
        let dialect = self.engine.dialect();
        let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| dialect.typed_placeholder(i + 1, c.inferred_type))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(physical_name),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    /// Create the physical table for `columns`.
    ///
    /// The schema is checked before any DDL is issued; a single
    /// `CREATE TABLE` either succeeds or leaves nothing behind.
    pub async fn create_table(&self, physical_name: &str, columns: &[ColumnDescriptor]) -> Result<()> {
        validate_schema(physical_name, columns)?;

        let sql = self.create_table_sql(physical_name, columns);
        debug!(table = physical_name, sql = %sql, "creating table");

        self.engine
            .execute(&sql, &[])
            .await
            .map_err(|e| IngotError::SchemaCreation {
                physical_name: physical_name.to_string(),
                message: e.to_string(),
            })?;

        info!(table = physical_name, columns = columns.len(), "created table");
        Ok(())
    }

    /// Insert rows one at a time, in order.
    ///
    /// Fields beyond the column count are ignored and short rows are padded
    /// with NULLs. The first failing row stops the load; rows before it stay
    /// inserted and the error carries both the failing index and the count.
    pub async fn load_rows(
        &self,
        physical_name: &str,
        columns: &[ColumnDescriptor],
        rows: &[Vec<String>],
    ) -> Result<usize> {
        let sql = self.insert_sql(physical_name, columns);
        let mut inserted = 0usize;

        for (row_index, row) in rows.iter().enumerate() {
            let params = match bind_row(columns, row) {
                Ok(params) => params,
                Err(message) => return Err(load_error(physical_name, row_index, inserted, message)),
            };

            if let Err(e) = self.engine.execute(&sql, &params).await {
                return Err(load_error(physical_name, row_index, inserted, e.to_string()));
            }
            inserted += 1;
        }

        info!(table = physical_name, rows = inserted, "loaded rows");
        Ok(inserted)
    }

    /// Drop a physical table if it exists.
    pub async fn drop_table(&self, physical_name: &str) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(physical_name));
        self.engine.execute(&sql, &[]).await?;
        info!(table = physical_name, "dropped table");
        Ok(())
    }
}

fn bind_row(columns: &[ColumnDescriptor], row: &[String]) -> std::result::Result<Vec<SqlValue>, String> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            coerce_cell(row.get(i).map(String::as_str), column.inferred_type)
                .map_err(|e| format!("column '{}': {}", column.name, e))
        })
        .collect()
}

fn load_error(physical_name: &str, row_index: usize, rows_inserted: usize, message: String) -> IngotError {
    warn!(
        table = physical_name,
        row_index,
        rows_inserted,
        "row insert failed, stopping load"
    );
    IngotError::Load {
        row_index,
        rows_inserted,
        message,
    }
}

fn validate_schema(physical_name: &str, columns: &[ColumnDescriptor]) -> Result<()> {
    let fail = |message: String| IngotError::SchemaCreation {
        physical_name: physical_name.to_string(),
        message,
    };

    if !is_safe_identifier(physical_name) {
        return Err(fail(format!("'{}' is not a safe table identifier", physical_name)));
    }
    if columns.is_empty() {
        return Err(fail("schema has no columns".to_string()));
    }

    let mut seen: HashSet<&str> = ["id", "created_at"].into_iter().collect();
    for column in columns {
        if !is_safe_identifier(&column.name) {
            return Err(fail(format!("'{}' is not a safe column identifier", column.name)));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(fail(format!("duplicate column name '{}'", column.name)));
        }
    }

    Ok(())
}
