//! Catalog sync and cached reads.
//!
//! A sync is one upstream fetch followed by one snapshot write. There are no
//! retries: a failed attempt is reported to the caller as-is, and the caller
//! decides whether to sync again.

use std::sync::Arc;

use catalog_cache_core::{CredentialContext, Product};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::shopify::{CatalogClient, ShopifyError};
use crate::snapshot::{SnapshotError, SnapshotStore};

/// A completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of products persisted.
    pub count: usize,
    /// The persisted products, in upstream order.
    pub products: Vec<Product>,
}

/// Ways a sync can fail.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Shopify answered with GraphQL `errors`. The snapshot was not touched.
    #[error("Shopify rejected the catalog query: {0}")]
    UpstreamRejected(serde_json::Value),

    /// Shopify could not be reached or answered with a failure status. The
    /// snapshot was not touched.
    #[error("Shopify request failed: {message}")]
    Transport {
        /// Upstream HTTP status, if a response arrived.
        status: Option<u16>,
        /// Whether the request hit the configured timeout.
        timed_out: bool,
        message: String,
    },

    /// The fetch succeeded but the snapshot could not be written.
    #[error("Failed to persist snapshot: {source}")]
    Storage {
        #[source]
        source: SnapshotError,
        /// The products that were fetched but not persisted.
        products: Vec<Product>,
    },

    /// Anything else: an unusable response body, a bad endpoint.
    #[error("Unexpected Shopify failure: {0}")]
    Unexpected(#[source] ShopifyError),
}

impl From<ShopifyError> for SyncError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::GraphQL(errors) => Self::UpstreamRejected(errors),
            ShopifyError::Timeout(_) => Self::Transport {
                status: None,
                timed_out: true,
                message: err.to_string(),
            },
            ShopifyError::Status { status, message } => Self::Transport {
                status: Some(status),
                timed_out: false,
                message,
            },
            ShopifyError::Http(ref source) => Self::Transport {
                status: source.status().map(|s| s.as_u16()),
                timed_out: false,
                message: err.to_string(),
            },
            ShopifyError::Malformed(_) | ShopifyError::Client(_) | ShopifyError::Credential(_) => {
                Self::Unexpected(err)
            }
        }
    }
}

/// Sync orchestrator and read path over one snapshot.
///
/// Cheaply cloneable; clones share the HTTP client and the store's write lock.
#[derive(Clone)]
pub struct SyncService {
    client: CatalogClient,
    store: Arc<SnapshotStore>,
}

impl SyncService {
    pub fn new(client: CatalogClient, store: SnapshotStore) -> Self {
        Self {
            client,
            store: Arc::new(store),
        }
    }

    #[must_use]
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Fetch the catalog once and replace the snapshot with it.
    ///
    /// The store is only written after a successful fetch, so upstream and
    /// transport failures leave the previous snapshot exactly as it was.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]. `SyncError::Storage` still carries the fetched
    /// products.
    #[instrument(skip(self, credentials), fields(shop = %credentials.shop()))]
    pub async fn sync(&self, credentials: &CredentialContext) -> Result<SyncReport, SyncError> {
        let products = match self.client.fetch_products(credentials).await {
            Ok(products) => products,
            Err(e) => {
                let err = SyncError::from(e);
                warn!(error = %err, "Catalog sync aborted before writing the snapshot");
                return Err(err);
            }
        };

        if let Err(source) = self.store.write(&products).await {
            error!(error = %source, count = products.len(), "Fetched catalog could not be persisted");
            return Err(SyncError::Storage { source, products });
        }

        info!(count = products.len(), path = %self.store.path().display(), "Catalog synced");
        Ok(SyncReport {
            count: products.len(),
            products,
        })
    }

    /// Load the snapshot written by the last successful sync.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::NotFound` before the first sync, and the other
    /// `SnapshotError` variants if the snapshot cannot be loaded.
    pub async fn cached(&self) -> Result<Vec<Product>, SnapshotError> {
        self.store.read().await
    }
}
