//! Error types for the Ingot library.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the shape of the uploaded delimited text.
///
/// These are always caused by the uploaded data and are reported verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SourceFormatError {
    /// The source contains no records at all.
    #[error("CSV file is empty")]
    EmptySource,

    /// The first record has no fields.
    #[error("CSV file has no headers")]
    MissingHeaders,

    /// Only a header record is present.
    #[error("CSV file contains only headers, no data")]
    NoDataRows,
}

/// Main error type for Ingot operations.
#[derive(Debug, Error)]
pub enum IngotError {
    /// Error reading a local file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source text has no usable header or data records.
    #[error(transparent)]
    SourceFormat(#[from] SourceFormatError),

    /// Error from the CSV library (bad quoting, invalid UTF-8).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The requested logical table name was rejected.
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    /// The owner identity cannot be used for namespacing.
    #[error("Invalid owner id: {0}")]
    InvalidOwner(String),

    /// The physical table could not be created.
    #[error("Failed to create table '{physical_name}': {message}")]
    SchemaCreation {
        physical_name: String,
        message: String,
    },

    /// A row could not be inserted. Rows before `row_index` were kept.
    #[error("Failed to insert row {row_index} ({rows_inserted} rows inserted): {message}")]
    Load {
        /// Zero-based index of the failing data row.
        row_index: usize,
        /// Rows successfully inserted before the failure.
        rows_inserted: usize,
        message: String,
    },

    /// A physical table exists without a metadata record pointing at it,
    /// or the reverse. Needs operator cleanup.
    #[error("Inconsistent state for table '{physical_name}': {message}")]
    InconsistentState {
        physical_name: String,
        message: String,
    },

    /// Metadata store failure.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Requested table does not exist for this owner.
    #[error("Table not found: {0}")]
    NotFound(String),

    /// Storage engine failure.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngotError {
    /// True when the error was caused by the uploaded data or request
    /// rather than by the server or storage engine.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            IngotError::SourceFormat(_)
                | IngotError::Csv(_)
                | IngotError::InvalidTableName(_)
                | IngotError::InvalidOwner(_)
                | IngotError::Load { .. }
        )
    }
}

/// Result type alias for Ingot operations.
pub type Result<T> = std::result::Result<T, IngotError>;
