//! Table upload, listing and deletion handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use ingot::{IngestRequest, TableMetadata};
use serde::Serialize;

use crate::server::error::ApiError;
use crate::server::owner::Owner;
use crate::server::state::AppState;

/// Response after a successful upload.
#[derive(Serialize)]
pub struct UploadResponse {
    pub table_id: String,
    pub table_name: String,
    pub filename: String,
    pub rows_imported: usize,
    pub columns: Vec<String>,
    pub message: String,
}

/// One entry in the table listing.
#[derive(Serialize)]
pub struct TableSummary {
    pub id: String,
    pub name: String,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub created_at: DateTime<Utc>,
}

impl From<TableMetadata> for TableSummary {
    fn from(table: TableMetadata) -> Self {
        Self {
            id: table.id,
            name: table.table_name,
            filename: table.original_filename,
            rows: table.row_count,
            columns: table.column_count,
            created_at: table.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct TableListResponse {
    pub tables: Vec<TableSummary>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub table_id: String,
}

/// POST /api/tables
///
/// Multipart form with a `file` part (a `.csv` upload) and a `table_name` part.
pub async fn upload_table(
    State(state): State<AppState>,
    Owner(owner): Owner,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut table_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("File too large or invalid form data: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("File too large or invalid form data: {}", e))
                })?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("table_name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid table name: {}", e)))?;
                table_name = Some(text);
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if !filename.to_lowercase().ends_with(".csv") {
        return Err(ApiError::BadRequest("Only CSV files are supported".to_string()));
    }
    let table_name = table_name.unwrap_or_default();

    let report = state
        .ingot
        .ingest(IngestRequest {
            owner_id: &owner,
            table_name: &table_name,
            source_name: &filename,
            data: &data,
        })
        .await?;

    let message = match &report.load_error {
        Some(failure) => format!(
            "Data partially imported: row {} failed: {}",
            failure.row_index, failure.message
        ),
        None => "Data imported successfully".to_string(),
    };

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            table_id: report.table.id,
            table_name: report.table.table_name,
            filename: report.table.original_filename,
            rows_imported: report.rows_imported,
            columns: report.columns.into_iter().map(|c| c.name).collect(),
            message,
        }),
    ))
}

/// GET /api/tables
pub async fn list_tables(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<TableListResponse>, ApiError> {
    let tables: Vec<TableSummary> = state
        .ingot
        .list_tables(&owner)
        .await?
        .into_iter()
        .map(TableSummary::from)
        .collect();

    Ok(Json(TableListResponse {
        total: tables.len(),
        tables,
    }))
}

/// GET /api/tables/:id
pub async fn get_table(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(table_id): Path<String>,
) -> Result<Json<TableMetadata>, ApiError> {
    Ok(Json(state.ingot.describe(&owner, &table_id).await?))
}

/// DELETE /api/tables/:id
pub async fn delete_table(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(table_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.ingot.drop_table(&owner, &table_id).await?;

    Ok(Json(DeleteResponse {
        message: "Table deleted successfully".to_string(),
        table_id,
    }))
}
