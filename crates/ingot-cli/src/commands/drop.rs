//! Drop command - remove a table and its metadata.

use colored::Colorize;
use ingot::IngotConfig;

use super::{open_ingot, require_owner, CommandResult};

pub async fn run(database_url: &str, owner: Option<String>, id: String) -> CommandResult {
    let owner = require_owner(owner)?;
    let ingot = open_ingot(database_url, IngotConfig::default()).await?;

    let table = ingot.drop_table(&owner, &id).await?;

    println!(
        "{} {} ({})",
        "Dropped".green().bold(),
        table.table_name.white(),
        table.physical_table_name
    );

    Ok(())
}
