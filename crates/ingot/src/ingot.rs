//! Main Ingot struct and the ingestion use cases.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::catalog::{MetadataStore, NewTableRecord, TableMetadata};
use crate::error::{IngotError, Result};
use crate::inference::{InferenceConfig, TypeInferrer};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::provision::TableProvisioner;
use crate::sanitize::{
    sanitize_physical_table_name, validate_owner_id, validate_table_name, MAX_IDENTIFIER_LEN,
};
use crate::schema::ColumnDescriptor;
use crate::store::{quote_ident, SqlValue, StorageEngine};

/// Default page size for [`Ingot::read_page`].
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Largest page size for [`Ingot::read_page`].
pub const MAX_PAGE_LIMIT: usize = 1000;

/// What to do with a table whose row load failed part way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    /// Drop the table and report the load error.
    #[default]
    Abort,
    /// Keep the rows inserted so far and record the table.
    KeepPartial,
}

/// Configuration for ingestion.
#[derive(Debug, Clone)]
pub struct IngotConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Type inference configuration.
    pub inference: InferenceConfig,
    /// Longest accepted logical table name, in characters.
    pub max_table_name_len: usize,
    /// Handling of partially loaded tables.
    pub load_failure: LoadFailurePolicy,
}

impl Default for IngotConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            inference: InferenceConfig::default(),
            max_table_name_len: 255,
            load_failure: LoadFailurePolicy::default(),
        }
    }
}

/// One upload to ingest.
#[derive(Debug, Clone, Copy)]
pub struct IngestRequest<'a> {
    /// Opaque owner identity from the auth layer.
    pub owner_id: &'a str,
    /// User-chosen logical table name.
    pub table_name: &'a str,
    /// Original file name of the upload.
    pub source_name: &'a str,
    /// Raw delimited text.
    pub data: &'a [u8],
}

/// Row failure recorded under [`LoadFailurePolicy::KeepPartial`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub row_index: usize,
    pub message: String,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// The stored metadata record.
    pub table: TableMetadata,
    /// Facts about the uploaded bytes.
    pub source: SourceMetadata,
    /// Inferred columns in order.
    pub columns: Vec<ColumnDescriptor>,
    pub rows_imported: usize,
    /// Set when rows were skipped after a failing row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<LoadFailure>,
}

/// Page selection for [`Ingot::read_page`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageRequest {
    /// 1-based page number; invalid values fall back to 1.
    pub fn page(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// Page size; values outside 1..=1000 fall back to the default.
    pub fn limit(&self) -> usize {
        self.limit
            .filter(|l| (1..=MAX_PAGE_LIMIT).contains(l))
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

/// Pagination details for a [`TablePage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
}

/// One page of stored rows.
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub table_id: String,
    pub table_name: String,
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub data: Vec<IndexMap<String, SqlValue>>,
    pub pagination: Pagination,
}

/// The ingestion engine: turns uploads into typed tables.
#[derive(Clone)]
pub struct Ingot {
    config: IngotConfig,
    parser: Parser,
    engine: Arc<dyn StorageEngine>,
    catalog: Arc<dyn MetadataStore>,
}

impl Ingot {
    /// Create an Ingot instance with default configuration.
    pub fn new(engine: Arc<dyn StorageEngine>, catalog: Arc<dyn MetadataStore>) -> Self {
        Self::with_config(engine, catalog, IngotConfig::default())
    }

    /// Create an Ingot instance with custom configuration.
    pub fn with_config(
        engine: Arc<dyn StorageEngine>,
        catalog: Arc<dyn MetadataStore>,
        config: IngotConfig,
    ) -> Self {
        let parser = Parser::with_config(config.parser.clone())
            .with_inferrer(TypeInferrer::with_config(config.inference.clone()));

        Self {
            config,
            parser,
            engine,
            catalog,
        }
    }

    pub fn config(&self) -> &IngotConfig {
        &self.config
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Ingest one upload end to end.
    ///
    /// Validates the request, parses and types the source, creates the
    /// physical table, loads the rows and records the metadata. Any failing
    /// step stops the rest.
    pub async fn ingest(&self, request: IngestRequest<'_>) -> Result<IngestReport> {
        validate_owner_id(request.owner_id)?;
        validate_table_name(request.table_name, self.config.max_table_name_len)?;
        let table_name = request.table_name.trim();

        let (dataset, source) = self.parser.parse_source(request.source_name, request.data)?;
        info!(
            table_name,
            file = %source.file,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed upload"
        );

        let physical_name = self.free_physical_name(request.owner_id, table_name).await?;
        let provisioner = TableProvisioner::new(self.engine.as_ref());

        provisioner.create_table(&physical_name, &dataset.columns).await?;

        let (rows_imported, load_error) = match provisioner
            .load_rows(&physical_name, &dataset.columns, &dataset.rows)
            .await
        {
            Ok(count) => (count, None),
            Err(IngotError::Load {
                row_index,
                rows_inserted,
                message,
            }) if self.config.load_failure == LoadFailurePolicy::KeepPartial => {
                (rows_inserted, Some(LoadFailure { row_index, message }))
            }
            Err(err) => {
                self.compensate(&provisioner, &physical_name).await?;
                return Err(err);
            }
        };

        let record = NewTableRecord {
            owner_id: request.owner_id.to_string(),
            table_name: table_name.to_string(),
            original_filename: request.source_name.to_string(),
            column_count: dataset.column_count(),
            row_count: rows_imported,
            table_schema: dataset.schema_map(),
            physical_table_name: physical_name.clone(),
        };

        let table = match self.catalog.insert(record).await {
            Ok(table) => table,
            Err(err) => {
                warn!(table = %physical_name, error = %err, "metadata insert failed");
                self.compensate(&provisioner, &physical_name).await?;
                return Err(err);
            }
        };

        info!(
            table_id = %table.id,
            table = %physical_name,
            rows = rows_imported,
            "ingested upload"
        );

        Ok(IngestReport {
            table,
            source,
            columns: dataset.columns,
            rows_imported,
            load_error,
        })
    }

    /// Drop a just-created table after a later step failed.
    async fn compensate(&self, provisioner: &TableProvisioner<'_>, physical_name: &str) -> Result<()> {
        if let Err(drop_err) = provisioner.drop_table(physical_name).await {
            error!(table = physical_name, error = %drop_err, "compensating drop failed");
            return Err(IngotError::InconsistentState {
                physical_name: physical_name.to_string(),
                message: format!("table left without metadata: {}", drop_err),
            });
        }
        warn!(table = physical_name, "dropped table after failed ingestion");
        Ok(())
    }

    /// Physical name for the owner's logical name, suffixed `_2`, `_3`, ...
    /// when an earlier table already uses it.
    async fn free_physical_name(&self, owner_id: &str, table_name: &str) -> Result<String> {
        let base = sanitize_physical_table_name(owner_id, table_name);
        let mut candidate = base.clone();
        let mut n = 2usize;

        while self.catalog.physical_name_taken(&candidate).await? {
            let suffix = format!("_{}", n);
            let stem: String = base.chars().take(MAX_IDENTIFIER_LEN - suffix.len()).collect();
            candidate = format!("{}{}", stem, suffix);
            n += 1;
        }

        Ok(candidate)
    }

    /// The owner's tables, newest first.
    pub async fn list_tables(&self, owner_id: &str) -> Result<Vec<TableMetadata>> {
        self.catalog.list(owner_id).await
    }

    /// One of the owner's tables.
    pub async fn describe(&self, owner_id: &str, table_id: &str) -> Result<TableMetadata> {
        self.catalog
            .get(owner_id, table_id)
            .await?
            .ok_or_else(|| IngotError::NotFound(table_id.to_string()))
    }

    /// Drop a table and delete its metadata record.
    ///
    /// The physical table goes first; a record left behind after a
    /// successful drop is reported as [`IngotError::InconsistentState`].
    pub async fn drop_table(&self, owner_id: &str, table_id: &str) -> Result<TableMetadata> {
        let table = self.describe(owner_id, table_id).await?;

        let provisioner = TableProvisioner::new(self.engine.as_ref());
        provisioner.drop_table(&table.physical_table_name).await?;

        match self.catalog.delete(owner_id, table_id).await {
            Ok(true) => {
                info!(table_id, table = %table.physical_table_name, "deleted table");
                Ok(table)
            }
            Ok(false) => Err(IngotError::InconsistentState {
                physical_name: table.physical_table_name,
                message: "metadata record vanished during delete".to_string(),
            }),
            Err(err) => {
                error!(table_id, error = %err, "metadata delete failed after drop");
                Err(IngotError::InconsistentState {
                    physical_name: table.physical_table_name,
                    message: format!("table dropped but metadata remains: {}", err),
                })
            }
        }
    }

    /// Read one page of a table's rows in insertion order.
    pub async fn read_page(
        &self,
        owner_id: &str,
        table_id: &str,
        request: PageRequest,
    ) -> Result<TablePage> {
        let table = self.describe(owner_id, table_id).await?;
        let page = request.page();
        let limit = request.limit();
        // Past the representable range there are no rows to return.
        let offset = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(limit))
            .and_then(|o| i64::try_from(o).ok());

        let columns: Vec<String> = table.table_schema.keys().cloned().collect();
        let dialect = self.engine.dialect();
        let select: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
            select.join(", "),
            quote_ident(&table.physical_table_name),
            quote_ident("id"),
            dialect.placeholder(1),
            dialect.placeholder(2)
        );

        let rows = match offset {
            Some(offset) => {
                self.engine
                    .query(&sql, &[SqlValue::Integer(limit as i64), SqlValue::Integer(offset)])
                    .await?
            }
            None => Vec::new(),
        };

        let data = rows
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect())
            .collect();

        let total_pages = table.row_count.div_ceil(limit);

        Ok(TablePage {
            table_id: table.id,
            table_name: table.table_name,
            total_rows: table.row_count,
            columns,
            data,
            pagination: Pagination {
                current_page: page,
                per_page: limit,
                total_pages,
                has_next: page < total_pages,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_PAGE_LIMIT);

        let req = PageRequest {
            page: Some(0),
            limit: Some(5000),
        };
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_PAGE_LIMIT);

        let req = PageRequest {
            page: Some(3),
            limit: Some(25),
        };
        assert_eq!(req.page(), 3);
        assert_eq!(req.limit(), 25);
    }
}
