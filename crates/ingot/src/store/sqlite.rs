//! SQLite storage engine backed by an sqlx pool.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, TypeInfo, ValueRef};

use super::{Dialect, SqlValue, StorageEngine};
use crate::error::Result;

/// SQLite engine.
#[derive(Debug, Clone)]
pub struct SqliteEngine {
    pool: SqlitePool,
}

impl SqliteEngine {
    /// Connect to a SQLite database URL, e.g. `sqlite://ingot.db?mode=rwc`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Uses a single connection that is never recycled, since every SQLite
    /// memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        // SQLite has no decimal type; NUMERIC affinity converts the text.
        SqlValue::Numeric(v) => query.bind(v.to_string()),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
    }
}

fn decode_row(row: &SqliteRow) -> Result<Vec<SqlValue>> {
    let mut cells = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            cells.push(SqlValue::Null);
            continue;
        }
        let type_name = raw.type_info().name().to_string();
        let cell = match type_name.as_str() {
            "INTEGER" => SqlValue::Integer(row.try_get::<i64, _>(index)?),
            "REAL" => SqlValue::Real(row.try_get::<f64, _>(index)?),
            "BLOB" => SqlValue::Text(String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(index)?).into_owned()),
            _ => SqlValue::Text(row.try_get::<String, _>(index)?),
        };
        cells.push(cell);
    }
    Ok(cells)
}

#[async_trait]
impl StorageEngine for SqliteEngine {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<u64> {
        let query = params
            .iter()
            .fold(sqlx::query(statement), bind_value);
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn query(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<Vec<SqlValue>>> {
        let query = params
            .iter()
            .fold(sqlx::query(statement), bind_value);
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }
}
