//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Default upload cap for the HTTP server: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Ingot: load CSV files into typed database tables
#[derive(Parser)]
#[command(name = "ingot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database URL (sqlite:// or postgres://)
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://ingot.db?mode=rwc"
    )]
    pub database_url: String,

    /// Owner identity used to namespace tables
    #[arg(long, global = true, env = "INGOT_OWNER")]
    pub owner: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a CSV file into a new table
    Ingest {
        /// Path to the CSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Table name (default: file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Auto-detect the delimiter instead of assuming a comma
        #[arg(long)]
        detect_delimiter: bool,

        /// Keep rows loaded before a failing row instead of dropping the table
        #[arg(long)]
        keep_partial: bool,
    },

    /// List your tables
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a table's schema and a page of its rows
    Show {
        /// Table id
        #[arg(value_name = "TABLE_ID")]
        id: String,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page (1-1000)
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop a table and its metadata
    Drop {
        /// Table id
        #[arg(value_name = "TABLE_ID")]
        id: String,
    },

    /// Run the HTTP API server
    Serve {
        /// Port for the web server
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,

        /// Largest accepted upload in bytes
        #[arg(long, env = "MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
        max_file_size: usize,
    },
}

/// Log output format choice
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::try_parse_from([
            "ingot",
            "--owner",
            "a1b2c3d4-0000",
            "ingest",
            "sales.csv",
            "--name",
            "Sales",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.owner.as_deref(), Some("a1b2c3d4-0000"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ingest { file, name, .. } => {
                assert_eq!(file, PathBuf::from("sales.csv"));
                assert_eq!(name.as_deref(), Some("Sales"));
            }
            _ => panic!("expected ingest"),
        }
    }
}
