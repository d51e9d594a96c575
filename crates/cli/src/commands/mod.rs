//! CLI command implementations.

pub mod check_connection;
pub mod show;
pub mod sync;

use std::path::PathBuf;

use catalog_cache_proxy::config::{ConfigError, ProxyConfig};
use catalog_cache_proxy::services::SyncError;
use catalog_cache_proxy::shopify::ShopifyError;
use catalog_cache_proxy::snapshot::SnapshotError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Shopify credentials are not set.
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    /// The Shopify client could not be built or a call failed.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    /// A sync failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The snapshot could not be read.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// None of the tried API versions accepted the credentials.
    #[error("No working API version among: {}", .0.join(", "))]
    NoWorkingVersion(Vec<String>),
}

/// Load the proxy configuration, applying a snapshot path override.
fn load_config(snapshot: Option<PathBuf>) -> Result<ProxyConfig, CliError> {
    let mut config = ProxyConfig::from_env()?;
    if let Some(path) = snapshot {
        config.snapshot_path = path;
    }
    Ok(config)
}
