//! Ingest command - load a CSV file into a new table.

use std::path::PathBuf;

use colored::Colorize;
use ingot::{IngestRequest, IngotConfig, LoadFailurePolicy, ParserConfig};

use super::{open_ingot, require_owner, CommandResult};

pub async fn run(
    database_url: &str,
    owner: Option<String>,
    file: PathBuf,
    name: Option<String>,
    detect_delimiter: bool,
    keep_partial: bool,
) -> CommandResult {
    let owner = require_owner(owner)?;

    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let source_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let table_name = name.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_name.clone())
    });

    println!(
        "{} {} {} {}",
        "Ingesting".cyan().bold(),
        file.display().to_string().white(),
        "as".cyan(),
        table_name.white().bold()
    );

    let mut config = IngotConfig::default();
    if detect_delimiter {
        config.parser = ParserConfig {
            delimiter: None,
            ..ParserConfig::default()
        };
    }
    if keep_partial {
        config.load_failure = LoadFailurePolicy::KeepPartial;
    }

    let data = tokio::fs::read(&file).await?;
    let ingot = open_ingot(database_url, config).await?;

    let report = ingot
        .ingest(IngestRequest {
            owner_id: &owner,
            table_name: &table_name,
            source_name: &source_name,
            data: &data,
        })
        .await?;

    println!();
    println!("{}", "Schema:".yellow().bold());
    for column in &report.columns {
        println!(
            "  {:30} {:10} {}",
            column.name,
            column.inferred_type.to_string(),
            column.sample_value.dimmed()
        );
    }
    println!();

    if let Some(failure) = &report.load_error {
        println!(
            "{} row {} failed: {}",
            "Warning:".yellow().bold(),
            failure.row_index,
            failure.message
        );
    }

    println!(
        "{} {} rows into {}",
        "Imported".green().bold(),
        report.rows_imported.to_string().white().bold(),
        report.table.physical_table_name.white()
    );
    println!("Table id: {}", report.table.id.cyan());

    Ok(())
}
