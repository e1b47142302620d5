//! Ingot CLI - load CSV files into typed database tables.

mod cli;
mod commands;
mod logging;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use logging::LogConfig;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let serving = matches!(cli.command, Commands::Serve { .. });
    logging::init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_format(cli.log_format.into())
            .with_timestamps(serving),
    );

    let database_url = cli.database_url;
    let owner = cli.owner;

    let result = match cli.command {
        Commands::Ingest {
            file,
            name,
            detect_delimiter,
            keep_partial,
        } => {
            commands::ingest::run(
                &database_url,
                owner,
                file,
                name,
                detect_delimiter,
                keep_partial,
            )
            .await
        }

        Commands::List { json } => commands::list::run(&database_url, owner, json).await,

        Commands::Show {
            id,
            page,
            limit,
            json,
        } => commands::show::run(&database_url, owner, id, page, limit, json).await,

        Commands::Drop { id } => commands::drop::run(&database_url, owner, id).await,

        Commands::Serve {
            port,
            max_file_size,
        } => commands::serve::run(&database_url, port, max_file_size).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
