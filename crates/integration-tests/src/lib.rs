//! Integration tests for the catalog cache proxy.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no network access needed)
//! cargo test -p catalog-cache-integration-tests
//!
//! # Smoke tests against a running proxy with real Shopify credentials
//! cargo run -p catalog-cache-proxy &
//! CATALOG_PROXY_URL=http://localhost:3000 \
//!     cargo test -p catalog-cache-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `in_process` - Full middleware stack served on a local port
//! - `smoke` - Live proxy and live Shopify shop

#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use catalog_cache_proxy::config::ProxyConfig;
use catalog_cache_proxy::middleware::with_rate_limit;
use catalog_cache_proxy::state::AppState;

/// Base URL of a running proxy (configurable via environment).
#[must_use]
pub fn proxy_base_url() -> String {
    std::env::var("CATALOG_PROXY_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build a configuration from `vars` only, ignoring the process environment,
/// with the snapshot stored in `dir`.
///
/// # Panics
///
/// Panics if `vars` contains an invalid value.
#[must_use]
pub fn config_from(vars: &[(&str, &str)], dir: &Path) -> ProxyConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let mut config =
        ProxyConfig::from_lookup(|key| map.get(key).cloned()).expect("Invalid test configuration");
    config.snapshot_path = dir.join("products.json");
    config
}

/// Serve the full proxy stack (including rate limiting) on an ephemeral
/// local port and return its base URL.
///
/// # Panics
///
/// Panics if the state or listener cannot be created.
pub async fn spawn_proxy(config: ProxyConfig) -> String {
    let rate_limit = config.rate_limit;
    let state = AppState::new(config).expect("Failed to create application state");
    let app = with_rate_limit(catalog_cache_proxy::app(state), &rate_limit)
        .expect("Invalid rate limit");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .ok();
    });

    format!("http://{addr}")
}
