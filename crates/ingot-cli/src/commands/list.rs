//! List command - show the owner's tables.

use colored::Colorize;
use ingot::IngotConfig;

use super::{open_ingot, require_owner, CommandResult};

pub async fn run(database_url: &str, owner: Option<String>, json_output: bool) -> CommandResult {
    let owner = require_owner(owner)?;
    let ingot = open_ingot(database_url, IngotConfig::default()).await?;
    let tables = ingot.list_tables(&owner).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    if tables.is_empty() {
        println!("{}", "No tables yet.".dimmed());
        return Ok(());
    }

    println!(
        "{:36}  {:24}  {:>8}  {:>7}  {}",
        "ID".bold(),
        "NAME".bold(),
        "ROWS".bold(),
        "COLUMNS".bold(),
        "CREATED".bold()
    );
    for table in &tables {
        println!(
            "{:36}  {:24}  {:>8}  {:>7}  {}",
            table.id.cyan(),
            table.table_name,
            table.row_count,
            table.column_count,
            table.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("{} tables", tables.len().to_string().white().bold());

    Ok(())
}
