//! Ingot: turns uploaded CSV files into typed, queryable database tables.
//!
//! An upload is parsed into headers and rows, each column gets a storage type
//! inferred from a sample of its values, and a physical table named after the
//! owner and the chosen label is created and loaded. A metadata record in the
//! catalog ties the user-facing name to the physical table.
//!
//! # Core Principles
//!
//! - **Owner isolation**: physical names carry an owner prefix and every
//!   catalog lookup is scoped to the owner
//! - **Safe identifiers**: headers and labels are sanitized before they reach SQL
//! - **No orphans**: a failed ingestion drops the table it created
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ingot::{IngestRequest, Ingot, MetadataStore, SqlCatalog, SqliteEngine};
//!
//! # async fn run() -> ingot::Result<()> {
//! let engine = Arc::new(SqliteEngine::connect("sqlite://ingot.db?mode=rwc").await?);
//! let catalog = Arc::new(SqlCatalog::new(engine.clone()));
//! catalog.migrate().await?;
//!
//! let ingot = Ingot::new(engine, catalog);
//! let report = ingot
//!     .ingest(IngestRequest {
//!         owner_id: "a1b2c3d4-0000",
//!         table_name: "Sales 2024",
//!         source_name: "sales.csv",
//!         data: b"name,qty\nwidget,3\n",
//!     })
//!     .await?;
//!
//! println!("Table: {}", report.table.physical_table_name);
//! println!("Rows: {}", report.rows_imported);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod inference;
pub mod input;
pub mod provision;
pub mod sanitize;
pub mod schema;
pub mod store;

mod ingot;

pub use crate::ingot::{
    IngestReport, IngestRequest, Ingot, IngotConfig, LoadFailure, LoadFailurePolicy, PageRequest,
    Pagination, TablePage, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use catalog::{MetadataStore, NewTableRecord, SqlCatalog, TableMetadata};
pub use error::{IngotError, Result, SourceFormatError};
pub use inference::{InferenceConfig, TypeInferrer};
pub use input::{Dataset, Parser, ParserConfig, SourceMetadata};
pub use provision::TableProvisioner;
pub use schema::{ColumnDescriptor, ColumnType, SchemaEntry, SchemaMap};
pub use store::{Dialect, PostgresEngine, SqlValue, SqliteEngine, StorageEngine};
