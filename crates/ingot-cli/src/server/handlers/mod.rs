//! API request handlers.

mod data;
mod tables;

pub use data::*;
pub use tables::*;

use axum::Json;
use serde_json::{json, Value};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Ingot API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
