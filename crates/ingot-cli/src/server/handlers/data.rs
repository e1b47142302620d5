//! Paged table data handler.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use ingot::{PageRequest, TablePage};

use crate::server::error::ApiError;
use crate::server::owner::Owner;
use crate::server::state::AppState;

/// GET /api/tables/:id/data?page=&limit=
///
/// Unparsable or out-of-range `page`/`limit` values fall back to the defaults.
pub async fn get_table_data(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(table_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TablePage>, ApiError> {
    let number = |key: &str| params.get(key).and_then(|v| v.trim().parse::<usize>().ok());
    let request = PageRequest {
        page: number("page"),
        limit: number("limit"),
    };

    Ok(Json(state.ingot.read_page(&owner, &table_id, request).await?))
}
