//! Show command - print a table's schema and a page of rows.

use colored::Colorize;
use ingot::{IngotConfig, PageRequest};

use super::{open_ingot, require_owner, CommandResult};

pub async fn run(
    database_url: &str,
    owner: Option<String>,
    id: String,
    page: usize,
    limit: usize,
    json_output: bool,
) -> CommandResult {
    let owner = require_owner(owner)?;
    let ingot = open_ingot(database_url, IngotConfig::default()).await?;

    let table = ingot.describe(&owner, &id).await?;
    let rows = ingot
        .read_page(
            &owner,
            &id,
            PageRequest {
                page: Some(page),
                limit: Some(limit),
            },
        )
        .await?;

    if json_output {
        let out = serde_json::json!({ "table": table, "page": rows });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Table".cyan().bold(),
        table.table_name.white().bold(),
        table.physical_table_name
    );
    println!("Source: {}", table.original_filename);
    println!();

    println!("{}", "Schema:".yellow().bold());
    for (name, entry) in &table.table_schema {
        println!("  {:30} {:10} {}", name, entry.column_type.to_string(), entry.sample.dimmed());
    }
    println!();

    println!("{}", rows.columns.join("\t").bold());
    for row in &rows.data {
        let cells: Vec<String> = row.values().map(|v| v.to_string()).collect();
        println!("{}", cells.join("\t"));
    }
    println!();
    println!(
        "Page {}/{} ({} rows total)",
        rows.pagination.current_page,
        rows.pagination.total_pages.max(1),
        rows.total_rows
    );

    Ok(())
}
