//! Catalog Cache CLI - One-shot syncs and diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Sync the catalog into the snapshot without running the proxy
//! catalog-cli sync
//!
//! # Summarize the cached snapshot
//! catalog-cli show --limit 10
//!
//! # Find an API version that works with the configured shop and token
//! catalog-cli check-connection --version 2024-10
//! ```
//!
//! All commands read the same environment variables as the proxy
//! (`SHOPIFY_SHOP_NAME`, `SHOPIFY_ADMIN_API_ACCESS_TOKEN`,
//! `CATALOG_SNAPSHOT_PATH`, ...), including a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Catalog cache CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog from Shopify and replace the snapshot
    Sync {
        /// Snapshot file (overrides `CATALOG_SNAPSHOT_PATH`)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },
    /// Print a summary of the cached snapshot
    Show {
        /// Snapshot file (overrides `CATALOG_SNAPSHOT_PATH`)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Maximum number of products to list
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Check which Admin API versions accept the configured credentials
    CheckConnection {
        /// API versions to try (repeatable); defaults to the known stable versions
        #[arg(long = "version", value_name = "VERSION")]
        versions: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Sync { snapshot } => {
            commands::sync::run(snapshot).await?;
        }
        Commands::Show { snapshot, limit } => {
            commands::show::run(snapshot, limit).await?;
        }
        Commands::CheckConnection { versions } => {
            commands::check_connection::run(versions).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_connection_versions() {
        let cli = Cli::try_parse_from([
            "catalog-cli",
            "check-connection",
            "--version",
            "2024-10",
            "--version",
            "2025-01",
        ])
        .unwrap();

        match cli.command {
            Commands::CheckConnection { versions } => {
                assert_eq!(versions, vec!["2024-10", "2025-01"]);
            }
            _ => panic!("expected check-connection"),
        }
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = Cli::try_parse_from(["catalog-cli", "show"]).unwrap();

        match cli.command {
            Commands::Show { snapshot, limit } => {
                assert!(snapshot.is_none());
                assert_eq!(limit, 20);
            }
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["catalog-cli", "migrate"]).is_err());
    }
}
