//! Shopify connection diagnostics.
//!
//! Tries the configured shop and token against several Admin API versions,
//! stops at the first one that answers a `shop { name }` query, and lists a
//! few product titles with it.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli check-connection
//! catalog-cli check-connection --version 2024-10 --version 2025-01
//! ```

use std::time::Duration;

use catalog_cache_core::CredentialContext;
use catalog_cache_proxy::config::ShopifyConfig;
use catalog_cache_proxy::shopify::CatalogClient;

use super::{CliError, load_config};

/// Versions tried when none are given on the command line.
pub const DEFAULT_VERSIONS: &[&str] = &["2024-01", "2024-04", "2024-07", "2024-10"];

const CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const SAMPLE_TITLES: i64 = 5;

/// Run the check. Returns the first working API version.
pub async fn run(requested: Vec<String>) -> Result<String, CliError> {
    let config = load_config(None)?;
    let credentials = config
        .shopify
        .credentials
        .as_ref()
        .ok_or_else(|| CliError::MissingCredentials(config.shopify.missing.clone()))?;

    let shopify = ShopifyConfig {
        timeout: CHECK_TIMEOUT,
        ..config.shopify.clone()
    };
    let client = CatalogClient::new(&shopify)?;

    let versions = candidate_versions(requested, credentials.api_version());
    tracing::info!(
        "Checking {} against API versions: {}",
        credentials.shop(),
        versions.join(", ")
    );

    first_working_version(&client, credentials, &versions).await
}

/// Try each version in order and return the first one that answers the shop
/// query. Listing product titles is informational: a failure there is logged
/// and the working version is still returned.
async fn first_working_version(
    client: &CatalogClient,
    credentials: &CredentialContext,
    versions: &[String],
) -> Result<String, CliError> {
    for version in versions {
        let attempt = credentials.with_api_version(version);

        let shop = match client.shop_info(&attempt).await {
            Ok(shop) => shop,
            Err(e) => {
                tracing::warn!("API {version}: {e}");
                continue;
            }
        };

        tracing::info!(
            "API {version}: connected to \"{}\" ({})",
            shop.name,
            shop.email.as_deref().unwrap_or("no email")
        );

        match client.product_titles(&attempt, SAMPLE_TITLES).await {
            Ok(titles) => {
                tracing::info!("First {} products:", titles.len());
                for title in &titles {
                    tracing::info!("  - {title}");
                }
            }
            Err(e) => tracing::warn!("API {version}: listing products failed: {e}"),
        }

        if version != credentials.api_version() {
            tracing::warn!(
                "Configured version {} did not work; set SHOPIFY_API_VERSION={version}",
                credentials.api_version()
            );
        }
        return Ok(version.clone());
    }

    Err(CliError::NoWorkingVersion(versions.to_vec()))
}

/// The configured version first, then the requested (or default) versions,
/// without duplicates.
fn candidate_versions(requested: Vec<String>, configured: &str) -> Vec<String> {
    let requested: Vec<String> = requested
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .collect();
    let requested = if requested.is_empty() {
        DEFAULT_VERSIONS.iter().map(ToString::to_string).collect()
    } else {
        requested
    };

    let mut versions = vec![configured.to_string()];
    for version in requested {
        if !versions.contains(&version) {
            versions.push(version);
        }
    }
    versions
}
