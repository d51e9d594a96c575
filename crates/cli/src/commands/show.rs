//! Snapshot inspection.

use std::path::PathBuf;

use catalog_cache_proxy::snapshot::SnapshotStore;

use super::{CliError, load_config};

/// Print one line per cached product, up to `limit`.
pub async fn run(snapshot: Option<PathBuf>, limit: usize) -> Result<(), CliError> {
    let config = load_config(snapshot)?;
    let store = SnapshotStore::new(config.snapshot_path);

    let products = store.read().await?;

    tracing::info!(
        "{} products in {}",
        products.len(),
        store.path().display()
    );

    for product in products.iter().take(limit) {
        tracing::info!(
            "{} | {} | {} variant(s) | inventory {} | {}",
            product.id,
            product.title,
            product.variants.len(),
            product.total_inventory(),
            if product.is_available() {
                "available"
            } else {
                "unavailable"
            }
        );
    }

    if products.len() > limit {
        tracing::info!("... and {} more", products.len() - limit);
    }

    Ok(())
}
