//! CLI command implementations.

pub mod drop;
pub mod ingest;
pub mod list;
pub mod serve;
pub mod show;

use std::sync::Arc;

use ingot::{Ingot, IngotConfig, MetadataStore, SqlCatalog};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Connect to the database, make sure the catalog exists and build an engine.
pub async fn open_ingot(database_url: &str, config: IngotConfig) -> ingot::Result<Ingot> {
    let engine = ingot::store::connect(database_url).await?;
    let catalog = Arc::new(SqlCatalog::new(engine.clone()));
    catalog.migrate().await?;
    Ok(Ingot::with_config(engine, catalog, config))
}

/// The owner identity CLI commands act for.
pub fn require_owner(owner: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    owner.ok_or_else(|| "No owner given. Pass --owner or set INGOT_OWNER.".into())
}
