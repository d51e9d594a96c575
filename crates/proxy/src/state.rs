//! Application state shared across handlers.

use std::sync::Arc;

use catalog_cache_core::CredentialContext;

use crate::config::ProxyConfig;
use crate::services::SyncService;
use crate::shopify::{CatalogClient, ShopifyError};
use crate::snapshot::SnapshotStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// immutable configuration and the sync service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ProxyConfig,
    sync: SyncService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Client` if the HTTP client cannot be built.
    pub fn new(config: ProxyConfig) -> Result<Self, ShopifyError> {
        let client = CatalogClient::new(&config.shopify)?;
        let store = SnapshotStore::new(config.snapshot_path.clone());
        Ok(Self::from_parts(config, SyncService::new(client, store)))
    }

    /// Assemble state from an already built sync service.
    #[must_use]
    pub fn from_parts(config: ProxyConfig, sync: SyncService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, sync }),
        }
    }

    /// Get a reference to the proxy configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    /// Get a reference to the sync service.
    #[must_use]
    pub fn sync(&self) -> &SyncService {
        &self.inner.sync
    }

    /// Shopify credentials, if configured.
    #[must_use]
    pub fn credentials(&self) -> Option<&CredentialContext> {
        self.inner.config.shopify.credentials.as_ref()
    }
}
