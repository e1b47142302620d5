//! Postgres storage engine backed by an sqlx pool.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::query::Query;
use sqlx::{Row, TypeInfo, ValueRef};

use super::{Dialect, SqlValue, StorageEngine};
use crate::error::Result;

/// Postgres engine.
#[derive(Debug, Clone)]
pub struct PostgresEngine {
    pool: PgPool,
}

impl PostgresEngine {
    /// Connect to a `postgres://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self { pool })
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        // Typed placeholders cast this to the target column type.
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        SqlValue::Numeric(v) => query.bind(v.clone()),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
    }
}

fn decode_row(row: &PgRow) -> Result<Vec<SqlValue>> {
    let mut cells = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            cells.push(SqlValue::Null);
            continue;
        }
        let type_name = raw.type_info().name().to_string();
        let cell = match type_name.as_str() {
            "INT8" => SqlValue::Integer(row.try_get::<i64, _>(index)?),
            "INT4" => SqlValue::Integer(row.try_get::<i32, _>(index)?.into()),
            "INT2" => SqlValue::Integer(row.try_get::<i16, _>(index)?.into()),
            "FLOAT8" => SqlValue::Real(row.try_get::<f64, _>(index)?),
            "FLOAT4" => SqlValue::Real(row.try_get::<f32, _>(index)?.into()),
            "NUMERIC" => SqlValue::Numeric(row.try_get::<BigDecimal, _>(index)?),
            "DATE" => SqlValue::Date(row.try_get::<NaiveDate, _>(index)?),
            "TIMESTAMP" => SqlValue::Timestamp(row.try_get::<NaiveDateTime, _>(index)?),
            "TIMESTAMPTZ" => {
                SqlValue::Timestamp(row.try_get::<DateTime<Utc>, _>(index)?.naive_utc())
            }
            "BOOL" => SqlValue::Text(row.try_get::<bool, _>(index)?.to_string()),
            _ => SqlValue::Text(row.try_get::<String, _>(index)?),
        };
        cells.push(cell);
    }
    Ok(cells)
}

#[async_trait]
impl StorageEngine for PostgresEngine {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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
