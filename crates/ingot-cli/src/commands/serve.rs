//! Serve command - run the HTTP API.

use colored::Colorize;
use ingot::IngotConfig;

use super::{open_ingot, CommandResult};
use crate::server::{run_server, AppState};

pub async fn run(database_url: &str, port: u16, max_file_size: usize) -> CommandResult {
    let ingot = open_ingot(database_url, IngotConfig::default()).await?;
    let state = AppState::new(ingot, max_file_size);

    println!(
        "{} on port {}",
        "Starting Ingot API".cyan().bold(),
        port.to_string().white().bold()
    );
    println!("Press Ctrl+C to stop");

    run_server(state, port).await
}
