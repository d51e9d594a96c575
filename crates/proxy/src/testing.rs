//! Test helpers: a local stand-in for the Admin API and sample catalog data.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use catalog_cache_core::{CredentialContext, Product};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use crate::config::{Environment, ProxyConfig};
use crate::services::SyncService;
use crate::shopify::CatalogClient;
use crate::snapshot::SnapshotStore;
use crate::state::AppState;

/// A request received by [`FakeUpstream`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

/// Local HTTP server that answers every GraphQL POST with a canned response.
pub struct FakeUpstream {
    pub endpoint: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeUpstream {
    /// Answer with `body` as JSON.
    pub async fn start(status: StatusCode, body: Value) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    /// Answer with `body` as JSON after `delay`.
    pub async fn start_with_delay(status: StatusCode, body: Value, delay: Duration) -> Self {
        Self::spawn(status, body.to_string(), delay).await
    }

    /// Answer with a raw body.
    pub async fn start_raw(status: StatusCode, body: &str) -> Self {
        Self::spawn(status, body.to_string(), Duration::ZERO).await
    }

    async fn spawn(status: StatusCode, body: String, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let app = Router::new().route(
            "/graphql.json",
            post(move |headers: HeaderMap, payload: String| {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                async move {
                    recorded.lock().unwrap().push(RecordedRequest {
                        headers,
                        body: serde_json::from_str(&payload).unwrap_or(Value::Null),
                    });
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            endpoint: Url::parse(&format!("http://{addr}/graphql.json")).unwrap(),
            requests,
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// An endpoint on a port nobody is listening on.
pub async fn unreachable_endpoint() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/graphql.json")).unwrap()
}

/// Credentials for the `acme` test shop.
pub fn credentials() -> CredentialContext {
    CredentialContext::new("acme", SecretString::from("tok_abc"), Some("2024-01")).unwrap()
}

/// Application state whose client talks to `endpoint` and whose snapshot
/// lives in `dir`.
pub fn test_state(
    endpoint: Url,
    dir: &Path,
    with_credentials: bool,
    environment: Environment,
) -> AppState {
    let mut config = ProxyConfig::from_lookup(|_| None).unwrap();
    config.environment = environment;
    config.snapshot_path = dir.join("products.json");
    config.shopify.timeout = Duration::from_secs(5);
    if with_credentials {
        config.shopify.credentials = Some(credentials());
    }

    let client = CatalogClient::with_endpoint(&config.shopify, endpoint).unwrap();
    let store = SnapshotStore::new(config.snapshot_path.clone());
    AppState::from_parts(config, SyncService::new(client, store))
}

/// A flat product in snapshot shape.
pub fn sample_product(n: u32) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{n}"),
        "title": format!("Product {n}"),
        "handle": format!("product-{n}"),
        "description": "Freeze-dried and crunchy.",
        "productType": "Snacks",
        "vendor": "Acme",
        "tags": ["fruit"],
        "createdAt": "2024-01-15T10:00:00Z",
        "updatedAt": "2024-02-01T08:30:00Z",
        "status": "ACTIVE",
        "variants": [{
            "id": format!("gid://shopify/ProductVariant/{n}0"),
            "title": "Default Title",
            "price": "4.99",
            "sku": format!("SKU-{n}"),
            "inventoryQuantity": 7,
            "availableForSale": true
        }],
        "images": [{
            "id": format!("gid://shopify/ProductImage/{n}00"),
            "url": format!("https://cdn.shopify.com/s/files/{n}.jpg"),
            "altText": null
        }]
    })
}

/// Decode flat sample products.
pub fn sample_products(ids: &[u32]) -> Vec<Product> {
    ids.iter()
        .map(|n| serde_json::from_value(sample_product(*n)).unwrap())
        .collect()
}

/// Wrap flat products in the Admin API `edges { node }` response shape.
pub fn products_response(products: &[Value]) -> Value {
    let edges: Vec<Value> = products
        .iter()
        .map(|product| {
            let mut node = product.clone();
            for list in ["variants", "images"] {
                let items = node[list].as_array().cloned().unwrap_or_default();
                node[list] = json!({
                    "edges": items.into_iter().map(|item| json!({ "node": item })).collect::<Vec<_>>()
                });
            }
            json!({ "node": node })
        })
        .collect();

    json!({ "data": { "products": { "edges": edges } } })
}
