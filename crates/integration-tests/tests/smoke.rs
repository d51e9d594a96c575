//! Smoke tests against a running proxy.
//!
//! These tests require:
//! - The proxy running (cargo run -p catalog-cache-proxy)
//! - Valid Shopify credentials in its environment
//!
//! Run with: cargo test -p catalog-cache-integration-tests -- --ignored

use catalog_cache_integration_tests::proxy_base_url;
use reqwest::{Client, StatusCode};
use serde_json::Value;

#[tokio::test]
#[ignore = "Requires running proxy"]
async fn test_proxy_is_running() {
    let resp = Client::new()
        .get(format!("{}/", proxy_base_url()))
        .send()
        .await
        .expect("Failed to reach proxy");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "Catalog cache is running.");
}

#[tokio::test]
#[ignore = "Requires running proxy and Shopify credentials"]
async fn test_sync_then_read() {
    let client = Client::new();
    let base_url = proxy_base_url();

    let resp = client
        .post(format!("{base_url}/sync-products"))
        .send()
        .await
        .expect("Failed to sync");

    assert_eq!(resp.status(), StatusCode::OK);
    let synced: Value = resp.json().await.expect("Sync body is not JSON");
    assert_eq!(synced["success"], true);
    let count = synced["count"].as_u64().expect("count is a number");
    assert!(count <= 50, "sync is bounded to 50 products");

    let resp = client
        .get(format!("{base_url}/sync-products"))
        .send()
        .await
        .expect("Failed to read cache");

    assert_eq!(resp.status(), StatusCode::OK);
    let cached: Value = resp.json().await.expect("Read body is not JSON");
    assert_eq!(cached["count"], synced["count"]);
    assert_eq!(cached["products"], synced["products"]);
}

#[tokio::test]
#[ignore = "Requires running proxy and Shopify credentials"]
async fn test_products_have_bounded_children() {
    let resp = Client::new()
        .get(format!("{}/products", proxy_base_url()))
        .send()
        .await
        .expect("Failed to read cache");

    if resp.status() == StatusCode::NOT_FOUND {
        // Nothing synced yet
        return;
    }

    let body: Value = resp.json().await.expect("Body is not JSON");
    for product in body["products"].as_array().expect("products is an array") {
        let variants = product["variants"].as_array().expect("variants is an array");
        let images = product["images"].as_array().expect("images is an array");
        assert!(variants.len() <= 10);
        assert!(images.len() <= 5);
        assert!(
            product["id"]
                .as_str()
                .is_some_and(|id| id.starts_with("gid://shopify/Product/"))
        );
    }
}
