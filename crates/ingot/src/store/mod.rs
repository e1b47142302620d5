//! Storage engine capability used by the provisioner and the catalog.
//!
//! The core never holds a global connection; every component that talks to
//! the database receives a [`StorageEngine`] explicitly.

mod postgres;
mod sqlite;
mod value;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{IngotError, Result};
use crate::schema::ColumnType;

pub use postgres::PostgresEngine;
pub use sqlite::SqliteEngine;
pub use value::SqlValue;

/// SQL dialect differences the core has to account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Positional placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{}", index),
            Dialect::Postgres => format!("${}", index),
        }
    }

    /// Placeholder with an explicit cast, so NULLs bind against typed columns.
    pub fn typed_placeholder(&self, index: usize, column_type: ColumnType) -> String {
        match self {
            Dialect::Sqlite => self.placeholder(index),
            Dialect::Postgres => format!("${}::{}", index, self.storage_type(column_type)),
        }
    }

    /// Column type used to store values of `column_type`.
    pub fn storage_type(&self, column_type: ColumnType) -> &'static str {
        match (self, column_type) {
            (Dialect::Sqlite, ColumnType::Integer) => "INTEGER",
            (Dialect::Postgres, ColumnType::Integer) => "BIGINT",
            (_, ColumnType::Numeric) => "NUMERIC",
            (_, ColumnType::Date) => "DATE",
            (_, ColumnType::Text) => "TEXT",
        }
    }

    /// Definition of the engine-managed identity column.
    pub fn identity_column(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "\"id\" INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Postgres => "\"id\" BIGSERIAL PRIMARY KEY",
        }
    }

    /// Definition of the creation-timestamp column.
    pub fn created_at_column(&self) -> &'static str {
        "\"created_at\" TIMESTAMP DEFAULT CURRENT_TIMESTAMP"
    }
}

/// Quote an identifier for use in SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Minimal relational engine interface with positional parameters.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Dialect spoken by this engine.
    fn dialect(&self) -> Dialect;

    /// Run a DDL or DML statement, returning the number of affected rows.
    async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<u64>;

    /// Run a query and return every row as positional cells.
    async fn query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Vec<SqlValue>>>;
}

/// Open a storage engine from a connection URL.
///
/// `sqlite:` URLs open [`SqliteEngine`]; `postgres://` and `postgresql://`
/// open [`PostgresEngine`].
pub async fn connect(url: &str) -> Result<Arc<dyn StorageEngine>> {
    if url.starts_with("sqlite:") {
        Ok(Arc::new(SqliteEngine::connect(url).await?))
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(Arc::new(PostgresEngine::connect(url).await?))
    } else {
        Err(IngotError::Config(format!(
            "Unsupported database URL '{}'. Use sqlite: or postgres://",
            url
        )))
    }
}
