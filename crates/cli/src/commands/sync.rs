//! One-shot catalog sync.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli sync
//! catalog-cli sync --snapshot /var/lib/catalog/products.json
//! ```

use std::path::PathBuf;

use catalog_cache_proxy::services::SyncService;
use catalog_cache_proxy::shopify::CatalogClient;
use catalog_cache_proxy::snapshot::SnapshotStore;

use super::{CliError, load_config};

/// Fetch the catalog and replace the snapshot, exactly as `POST /sync` does.
///
/// Returns the number of products written.
pub async fn run(snapshot: Option<PathBuf>) -> Result<usize, CliError> {
    let config = load_config(snapshot)?;
    let credentials = config
        .shopify
        .credentials
        .as_ref()
        .ok_or_else(|| CliError::MissingCredentials(config.shopify.missing.clone()))?;

    let client = CatalogClient::new(&config.shopify)?;
    let service = SyncService::new(client, SnapshotStore::new(config.snapshot_path.clone()));

    tracing::info!(
        "Syncing {} (API {}) into {}...",
        credentials.shop(),
        credentials.api_version(),
        config.snapshot_path.display()
    );

    let report = service.sync(credentials).await?;

    tracing::info!("Synced {} products", report.count);
    Ok(report.count)
}
